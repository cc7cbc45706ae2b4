//! Game-wide configuration (C6/C10 ambient concern): the one documented
//! knob, whether Last-Guard promotion fires automatically.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GameOptions {
    pub last_guard_promotion: bool,
}

impl Default for GameOptions {
    fn default() -> Self {
        GameOptions { last_guard_promotion: true }
    }
}
