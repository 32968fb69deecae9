mod collaborative;
mod item_based;
mod latest;
mod offline;
mod popular;
mod user_based;

pub use collaborative::Collaborative;
pub use item_based::ItemBased;
pub use latest::Latest;
pub use offline::Offline;
pub use popular::Popular;
pub use user_based::UserBased;
