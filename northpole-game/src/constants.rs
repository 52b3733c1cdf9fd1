//! Fixed text and tuning values shared across the desk.

/// Meter ceiling; satisfaction and stress are clamped into `0..=METER_MAX`.
pub const METER_MAX: i32 = 100;
pub const METER_MIN: i32 = 0;

/// Display marker assigned to freshly generated tickets.
pub const JUST_NOW: &str = "Just now";

/// Responses longer than this many UTF-16 code units earn the effort tier.
pub const EFFORT_LENGTH_THRESHOLD: usize = 40;

/// Minimum keyword hits for the top tier.
pub const EXPERT_MATCHES: usize = 2;

/// Phrases that win a little goodwill without solving anything.
pub const CHARM_PHRASES: [&str; 2] = ["chimney", "cookies"];

pub const PRAISE_PREFIX: &str = "Excellent troubleshooting!";
pub const EFFORT_COMMENT: &str =
    "Good effort. The user is reasonably satisfied with your technical advice.";
pub const CHARM_COMMENT: &str =
    "Classic Santa! It didn't solve the tech issue, but the charm offensive worked.";
pub const CONFUSED_COMMENT: &str =
    "The user has no idea what you're talking about. Stress levels rising!";
pub const FALLBACK_COMMENT: &str =
    "Generic response processed by the automated North Pole mail bot.";

pub const LOG_BOOT: &str = "System initialized...";
pub const LOG_WELCOME: &str = "Welcome, Senior Support Engineer Claus.";
pub const GAME_OVER_NOTICE: &str = "CRITICAL SYSTEM FAILURE: Santa has reached peak stress levels! Time for a cookie break. Game Over.";

/// Quick responses the player can paste into the draft.
pub const CANNED_RESPONSES: [&str; 10] = [
    "Have you tried turning the chimney off and on again?",
    "This sounds like a Layer 8 problem (PEBCAK).",
    "I've checked the logs, it's definitely a DNS issue. It's always DNS.",
    "Please clear your cookie cache (and bring me some real cookies).",
    "It works on my sleigh.",
    "That's not a bug, it's a feature of the North Pole ecosystem.",
    "I'm escalating this to the Ghost of Christmas Future Support.",
    "Did you try power-cycling the reindeer?",
    "Please provide a traceroute from the Grotto to your location.",
    "The server is currently under heavy load (1,000,000 elves/sec).",
];
