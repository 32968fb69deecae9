//! Names of the cache-store keyspaces the core reads and writes.
//! See spec §4.1 for the full key-semantic table.

pub const POPULAR_ITEMS: &str = "PopularItems";
pub const LATEST_ITEMS: &str = "LatestItems";
pub const ITEM_NEIGHBORS: &str = "ItemNeighbors";
pub const USER_NEIGHBORS: &str = "UserNeighbors";
pub const OFFLINE_RECOMMEND: &str = "OfflineRecommend";
pub const COLLABORATIVE_RECOMMEND: &str = "CollaborativeRecommend";
pub const IGNORE_ITEMS: &str = "IgnoreItems";
pub const HIDDEN_ITEMS: &str = "HiddenItems";
pub const LAST_MODIFY_USER_TIME: &str = "LastModifyUserTime";
pub const LAST_MODIFY_ITEM_TIME: &str = "LastModifyItemTime";
