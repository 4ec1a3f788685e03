use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::cue::{Affiliation, Answer, Cue};

#[derive(Error, Debug)]
pub enum ScriptError {
    #[error("malformed script: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("duplicate entry for ({affiliation}, {cue}, {answer:?})")]
    Duplicate {
        affiliation: Affiliation,
        cue: Cue,
        answer: Answer,
    },
    #[error("entry ({affiliation}, {cue}) assigns an affiliation outside the unknown state")]
    AssignmentOutsideUnknown { affiliation: Affiliation, cue: Cue },
    #[error("entry ({affiliation}, {cue}) assigns the unknown affiliation")]
    AssignsUnknown { affiliation: Affiliation, cue: Cue },
}

/// Where an answer leads: the next cue, and for the opening questions the
/// affiliation the answer settles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub next: Cue,
    pub assign: Option<Affiliation>,
}

/// One row of the script table in its serialized form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptEntry {
    pub affiliation: Affiliation,
    pub cue: Cue,
    pub answer: Answer,
    pub next: Cue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assign: Option<Affiliation>,
}

/// The game's question graph as a lookup table keyed by
/// `(affiliation, last cue, answer)`.
///
/// Any key missing from the table leads to [`Cue::Lose`].
#[derive(Debug, Clone)]
pub struct Script {
    entries: Vec<ScriptEntry>,
    index: HashMap<(Affiliation, Cue, Answer), Transition>,
}

impl Script {
    pub fn from_entries(entries: Vec<ScriptEntry>) -> Result<Self, ScriptError> {
        let mut index = HashMap::with_capacity(entries.len());
        for e in &entries {
            match e.assign {
                Some(Affiliation::Unknown) => {
                    return Err(ScriptError::AssignsUnknown {
                        affiliation: e.affiliation,
                        cue: e.cue,
                    })
                }
                Some(_) if e.affiliation != Affiliation::Unknown => {
                    return Err(ScriptError::AssignmentOutsideUnknown {
                        affiliation: e.affiliation,
                        cue: e.cue,
                    })
                }
                _ => {}
            }
            let transition = Transition {
                next: e.next,
                assign: e.assign,
            };
            if index
                .insert((e.affiliation, e.cue, e.answer), transition)
                .is_some()
            {
                return Err(ScriptError::Duplicate {
                    affiliation: e.affiliation,
                    cue: e.cue,
                    answer: e.answer,
                });
            }
        }
        Ok(Self { entries, index })
    }

    /// The shipped spy-themed script: four affiliations, ten characters.
    pub fn standard() -> Self {
        use Affiliation::*;
        use Answer::{No, Yes};

        let rows: &[(Affiliation, Cue, Answer, Cue, Option<Affiliation>)] = &[
            // Opening questions settle the affiliation.
            (Unknown, Cue::QMi6, Yes, Cue::QMartinis, Some(Mi6)),
            (Unknown, Cue::QCia, Yes, Cue::QBondFriend, Some(Cia)),
            (Unknown, Cue::QKgb, Yes, Cue::QChief, Some(Kgb)),
            (Unknown, Cue::QCriminal, Yes, Cue::QChief, Some(Criminal)),
            (Unknown, Cue::QMi6, No, Cue::QCriminal, None),
            (Unknown, Cue::QKgb, No, Cue::QCia, None),
            (Unknown, Cue::QCriminal, No, Cue::QKgb, None),
            // MI6
            (Mi6, Cue::QMartinis, Yes, Cue::Win007, None),
            (Mi6, Cue::QAbbreviate, Yes, Cue::QChief, None),
            (Mi6, Cue::QChief, Yes, Cue::WinM, None),
            (Mi6, Cue::QSecretary, Yes, Cue::WinMoneypenny, None),
            (Mi6, Cue::QBondFriend, Yes, Cue::WinTanner, None),
            (Mi6, Cue::QMartinis, No, Cue::QAbbreviate, None),
            (Mi6, Cue::QAbbreviate, No, Cue::QSecretary, None),
            (Mi6, Cue::QChief, No, Cue::WinQ, None),
            (Mi6, Cue::QSecretary, No, Cue::QBondFriend, None),
            // CIA
            (Cia, Cue::QBondFriend, Yes, Cue::WinLeiter, None),
            // KGB
            (Kgb, Cue::QChief, Yes, Cue::WinGogol, None),
            (Kgb, Cue::QSecretary, Yes, Cue::WinRublevitch, None),
            (Kgb, Cue::QChief, No, Cue::QSecretary, None),
            // Criminal organization
            (Criminal, Cue::QChief, Yes, Cue::QAngora, None),
            (Criminal, Cue::QAngora, Yes, Cue::WinBlofeld, None),
            (Criminal, Cue::QDentures, Yes, Cue::WinJaws, None),
            (Criminal, Cue::QChief, No, Cue::QDentures, None),
        ];

        let entries = rows
            .iter()
            .map(|&(affiliation, cue, answer, next, assign)| ScriptEntry {
                affiliation,
                cue,
                answer,
                next,
                assign,
            })
            .collect();
        match Self::from_entries(entries) {
            Ok(script) => script,
            Err(e) => unreachable!("standard script is well-formed: {e}"),
        }
    }

    /// Looks up where `answer` leads; a missing entry means the player has
    /// stumped the game.
    pub fn next(&self, affiliation: Affiliation, cue: Cue, answer: Answer) -> Transition {
        self.index
            .get(&(affiliation, cue, answer))
            .copied()
            .unwrap_or(Transition {
                next: Cue::Lose,
                assign: None,
            })
    }

    pub fn entries(&self) -> &[ScriptEntry] {
        &self.entries
    }

    pub fn to_json(&self) -> Result<String, ScriptError> {
        Ok(serde_json::to_string_pretty(&self.entries)?)
    }

    pub fn from_json(json: &str) -> Result<Self, ScriptError> {
        let entries: Vec<ScriptEntry> = serde_json::from_str(json)?;
        Self::from_entries(entries)
    }
}

impl Default for Script {
    fn default() -> Self {
        Self::standard()
    }
}
