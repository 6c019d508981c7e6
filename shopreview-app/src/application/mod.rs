mod ports;
mod review_lifecycle;
mod shop_directory;

pub use ports::{IdentityProvider, ReviewStore, ShopCatalog};
pub use review_lifecycle::ReviewLifecycle;
pub use shop_directory::ShopDirectory;
