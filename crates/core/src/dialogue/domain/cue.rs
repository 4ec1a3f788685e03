use serde::{Deserialize, Serialize};

/// One clip of the spoken game script.
///
/// Serialized names match the audio resource names (`q_mi6`, `win_007`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cue {
    Intro,
    QMi6,
    QCia,
    QKgb,
    QCriminal,
    QMartinis,
    QAbbreviate,
    QChief,
    QSecretary,
    QBondFriend,
    QAngora,
    QDentures,
    #[serde(rename = "win_007")]
    Win007,
    WinM,
    WinQ,
    WinMoneypenny,
    WinTanner,
    WinLeiter,
    WinGogol,
    WinRublevitch,
    WinBlofeld,
    WinJaws,
    Lose,
}

impl Cue {
    pub const ALL: &[Cue] = &[
        Cue::Intro,
        Cue::QMi6,
        Cue::QCia,
        Cue::QKgb,
        Cue::QCriminal,
        Cue::QMartinis,
        Cue::QAbbreviate,
        Cue::QChief,
        Cue::QSecretary,
        Cue::QBondFriend,
        Cue::QAngora,
        Cue::QDentures,
        Cue::Win007,
        Cue::WinM,
        Cue::WinQ,
        Cue::WinMoneypenny,
        Cue::WinTanner,
        Cue::WinLeiter,
        Cue::WinGogol,
        Cue::WinRublevitch,
        Cue::WinBlofeld,
        Cue::WinJaws,
        Cue::Lose,
    ];

    /// The question asked once the introduction finishes.
    pub const FIRST_QUESTION: Cue = Cue::QMi6;

    pub fn resource_name(self) -> &'static str {
        match self {
            Cue::Intro => "intro",
            Cue::QMi6 => "q_mi6",
            Cue::QCia => "q_cia",
            Cue::QKgb => "q_kgb",
            Cue::QCriminal => "q_criminal",
            Cue::QMartinis => "q_martinis",
            Cue::QAbbreviate => "q_abbreviate",
            Cue::QChief => "q_chief",
            Cue::QSecretary => "q_secretary",
            Cue::QBondFriend => "q_bond_friend",
            Cue::QAngora => "q_angora",
            Cue::QDentures => "q_dentures",
            Cue::Win007 => "win_007",
            Cue::WinM => "win_m",
            Cue::WinQ => "win_q",
            Cue::WinMoneypenny => "win_moneypenny",
            Cue::WinTanner => "win_tanner",
            Cue::WinLeiter => "win_leiter",
            Cue::WinGogol => "win_gogol",
            Cue::WinRublevitch => "win_rublevitch",
            Cue::WinBlofeld => "win_blofeld",
            Cue::WinJaws => "win_jaws",
            Cue::Lose => "lose",
        }
    }

    pub fn is_win(self) -> bool {
        self.resource_name().starts_with("win_")
    }

    /// Win or lose: the round is over once this cue finishes.
    pub fn is_terminal(self) -> bool {
        self.is_win() || self == Cue::Lose
    }
}

impl std::fmt::Display for Cue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.resource_name())
    }
}

/// The organization the player's character works for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Affiliation {
    Unknown,
    Mi6,
    Cia,
    Kgb,
    Criminal,
}

impl std::fmt::Display for Affiliation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Affiliation::Unknown => write!(f, "unknown"),
            Affiliation::Mi6 => write!(f, "MI6"),
            Affiliation::Cia => write!(f, "CIA"),
            Affiliation::Kgb => write!(f, "KGB"),
            Affiliation::Criminal => write!(f, "criminal"),
        }
    }
}

/// A player's answer to the last question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Answer {
    Yes,
    No,
}
