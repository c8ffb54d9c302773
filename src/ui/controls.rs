use checkers_core::logic::board::Player;
use std::time::Duration;

/// How long each player's most recent search took.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchTimes {
    white: Option<Duration>,
    black: Option<Duration>,
}

impl SearchTimes {
    #[must_use]
    pub const fn get(&self, player: Player) -> Option<Duration> {
        match player {
            Player::White => self.white,
            Player::Black => self.black,
        }
    }

    pub const fn record(&mut self, player: Player, took: Duration) {
        match player {
            Player::White => self.white = Some(took),
            Player::Black => self.black = Some(took),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub label: String,
    pub disabled: bool,
}

/// One best-move button per player plus their timing annotations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Controls {
    pub white: Button,
    pub black: Button,
    pub took_white: Option<String>,
    pub took_black: Option<String>,
}

impl Controls {
    /// `can_search` is false whenever a best-move request would be ignored,
    /// which disables both buttons.
    #[must_use]
    pub fn new(searching: Option<Player>, can_search: bool, took: SearchTimes) -> Self {
        Self {
            white: button(Player::White, searching, can_search),
            black: button(Player::Black, searching, can_search),
            took_white: took_label(took.get(Player::White)),
            took_black: took_label(took.get(Player::Black)),
        }
    }

    #[must_use]
    pub const fn button(&self, player: Player) -> &Button {
        match player {
            Player::White => &self.white,
            Player::Black => &self.black,
        }
    }

    #[must_use]
    pub const fn took(&self, player: Player) -> Option<&String> {
        match player {
            Player::White => self.took_white.as_ref(),
            Player::Black => self.took_black.as_ref(),
        }
    }
}

const fn display_name(player: Player) -> &'static str {
    match player {
        Player::White => "White",
        Player::Black => "Black",
    }
}

fn button(player: Player, searching: Option<Player>, can_search: bool) -> Button {
    let label = if searching == Some(player) {
        format!("{} is making a move...", display_name(player))
    } else {
        format!("Make optimal {player} play")
    };
    Button {
        label,
        disabled: !can_search,
    }
}

fn took_label(took: Option<Duration>) -> Option<String> {
    took.filter(|d| !d.is_zero())
        .map(|d| format!("Took {}ms", d.as_millis()))
}
