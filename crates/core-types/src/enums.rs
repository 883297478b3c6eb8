use crate::error::CoreError;
use crate::structs::{Participant, Play};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The coarse classification of a play used by the role filters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayType {
    Pass,
    Run,
    /// Kicks, penalties, kneels, timeouts and anything else.
    #[default]
    Other,
}

impl PlayType {
    /// Maps the provider's raw `play_type` column onto the enum.
    pub fn from_raw(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pass" => PlayType::Pass,
            "run" => PlayType::Run,
            _ => PlayType::Other,
        }
    }
}

/// The three position groups the service reports on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Qb,
    Rb,
    Wr,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Qb, Role::Rb, Role::Wr];

    /// The participant a play is attributed to for this role.
    ///
    /// Quarterback scrambles carry no passer, only a rusher, so the QB role falls
    /// back to the rusher on dropbacks.
    pub fn participant<'a>(&self, play: &'a Play) -> Option<&'a Participant> {
        match self {
            Role::Qb => play
                .passer
                .as_ref()
                .or_else(|| if play.qb_dropback { play.rusher.as_ref() } else { None }),
            Role::Rb => play.rusher.as_ref(),
            Role::Wr => play.receiver.as_ref(),
        }
    }

    /// The participant whose *name* labels an aggregate for this role.
    pub fn named_participant<'a>(&self, play: &'a Play) -> Option<&'a Participant> {
        match self {
            Role::Qb => play.passer.as_ref(),
            Role::Rb => play.rusher.as_ref(),
            Role::Wr => play.receiver.as_ref(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Qb => "qb",
            Role::Rb => "rb",
            Role::Wr => "wr",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_str().to_uppercase())
    }
}

impl FromStr for Role {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "qb" | "quarterback" => Ok(Role::Qb),
            "rb" | "running_back" | "runningback" => Ok(Role::Rb),
            "wr" | "receiver" | "wide_receiver" => Ok(Role::Wr),
            other => Err(CoreError::InvalidInput(
                "role".to_string(),
                format!("'{other}' is not one of qb, rb, wr"),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_play_type_from_raw() {
        assert_eq!(PlayType::from_raw("pass"), PlayType::Pass);
        assert_eq!(PlayType::from_raw(" RUN "), PlayType::Run);
        assert_eq!(PlayType::from_raw("punt"), PlayType::Other);
        assert_eq!(PlayType::from_raw(""), PlayType::Other);
    }

    #[test]
    fn test_role_parsing() {
        assert_eq!("QB".parse::<Role>(), Ok(Role::Qb));
        assert_eq!("rb".parse::<Role>(), Ok(Role::Rb));
        assert_eq!("receiver".parse::<Role>(), Ok(Role::Wr));
        assert!("kicker".parse::<Role>().is_err());
        assert_eq!(Role::Wr.to_string(), "WR");
    }

    #[test]
    fn test_qb_participant_falls_back_to_scrambler() {
        let scramble = Play {
            play_type: PlayType::Run,
            qb_dropback: true,
            rusher: Some(Participant::new("00-1", Some("P.Mahomes"))),
            ..Default::default()
        };
        assert_eq!(Role::Qb.participant(&scramble).map(|p| p.id.as_str()), Some("00-1"));
        assert!(Role::Qb.named_participant(&scramble).is_none());

        let designed_run = Play {
            qb_dropback: false,
            ..scramble.clone()
        };
        assert!(Role::Qb.participant(&designed_run).is_none());
    }
}
