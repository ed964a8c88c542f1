// Standard leaderboard
pub const STANDARD_TOP_N: usize = 25;
pub const PODIUM_LAST_RANK: usize = 3;
pub const PODIUM_BASE: i64 = 2500;
pub const PODIUM_STEP: i64 = 250;
pub const TOP_TEN_LAST_RANK: usize = 10;
pub const TOP_TEN_BASE: i64 = 2125;
pub const TOP_TEN_STEP: i64 = 125;
pub const TAIL_BASE: i64 = 1450;
pub const TAIL_STEP: i64 = 50;
pub const AVERAGE_PLACE_DECIMALS: i32 = 4;

// Speedrun leaderboard
pub const SPEEDRUN_POINTS_SCALE: f64 = 100.0;
pub const SPEEDRUN_POPULARITY_ROOT: f64 = 6.0;
pub const SPEEDRUN_DECIMALS: i32 = 2;
/// Placeholder account id for "no second player" / anonymous runs
pub const ANONYMOUS_PLAYER_ID: &str = "0";

// Level rotation
pub const SELECTION_SIZE: usize = 5;
pub const BAN_LIST_CAPACITY: usize = 10;
