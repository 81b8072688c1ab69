//! Transmission ID: 14 characters, `D ttt EEEEE JJJ SS`.
//! A 9-char short form (`D ttt EEEEE`) is accepted and completed with the
//! current Julian day and sequence `01`.

use crate::error::ProtocolError;

/// Direction character carried in byte 0 of a Transmission ID.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    /// `R` — this side is sending a file to the MIP.
    Send,
    /// `T` — this side is receiving a file from the MIP.
    Receive,
}

impl Direction {
    fn from_char(c: char) -> Option<Self> {
        match c {
            'R' => Some(Self::Send),
            'T' => Some(Self::Receive),
            _ => None,
        }
    }

    fn as_char(self) -> char {
        match self {
            Self::Send => 'R',
            Self::Receive => 'T',
        }
    }
}

/// A parsed, normalized Transmission ID.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransmissionId {
    pub direction: Direction,
    pub transmission_type: String, // 3 digits
    pub endpoint: String,          // 5 digits
    pub julian_day: String,        // 3 digits, 001-366
    pub sequence: u8,              // 01-99
}

/// Supplies the current Julian day for completing short-form Transmission
/// IDs. Injected rather than calling `chrono::Local::now()` directly, so
/// tests can pin a fixed day instead of depending on wall-clock time.
pub trait JulianDayClock {
    /// Returns the current day of year, 1..=366.
    fn today_julian_day(&self) -> u16;
}

/// [`JulianDayClock`] backed by the system's local date.
pub struct SystemJulianDayClock;

impl JulianDayClock for SystemJulianDayClock {
    fn today_julian_day(&self) -> u16 {
        use chrono::Datelike;
        chrono::Local::now().date_naive().ordinal() as u16
    }
}

impl TransmissionId {
    /// Parses `raw` as either the 14-char full form or the 9-char short
    /// form (completed via `clock`). Any other length, an unrecognised
    /// direction character, or a non-digit field is
    /// [`ProtocolError::InvalidTxId`].
    pub fn parse(raw: &str, clock: &dyn JulianDayClock) -> Result<Self, ProtocolError> {
        let chars: Vec<char> = raw.chars().collect();

        match chars.len() {
            14 => Self::parse_full(raw, &chars),
            9 => Self::parse_short(raw, &chars, clock),
            _ => Err(ProtocolError::InvalidTxId {
                raw: raw.to_string(),
                reason: "length must be 9 (short form) or 14 (full form)",
            }),
        }
    }

    fn parse_full(raw: &str, chars: &[char]) -> Result<Self, ProtocolError> {
        let direction = Direction::from_char(chars[0]).ok_or(ProtocolError::InvalidTxId {
            raw: raw.to_string(),
            reason: "direction must be 'R' or 'T'",
        })?;

        let transmission_type: String = chars[1..4].iter().collect();
        let endpoint: String = chars[4..9].iter().collect();
        let julian_day: String = chars[9..12].iter().collect();
        let sequence_str: String = chars[12..14].iter().collect();

        require_digits(raw, &transmission_type)?;
        require_digits(raw, &endpoint)?;
        require_digits(raw, &julian_day)?;
        require_digits(raw, &sequence_str)?;

        let day: u16 = julian_day.parse().unwrap();
        if !(1..=366).contains(&day) {
            return Err(ProtocolError::InvalidTxId {
                raw: raw.to_string(),
                reason: "julian day must be 001-366",
            });
        }

        let sequence: u8 = sequence_str.parse().unwrap();
        if !(1..=99).contains(&sequence) {
            return Err(ProtocolError::InvalidTxId {
                raw: raw.to_string(),
                reason: "sequence must be 01-99",
            });
        }

        Ok(Self {
            direction,
            transmission_type,
            endpoint,
            julian_day,
            sequence,
        })
    }

    fn parse_short(
        raw: &str,
        chars: &[char],
        clock: &dyn JulianDayClock,
    ) -> Result<Self, ProtocolError> {
        let direction = Direction::from_char(chars[0]).ok_or(ProtocolError::InvalidTxId {
            raw: raw.to_string(),
            reason: "direction must be 'R' or 'T'",
        })?;

        let transmission_type: String = chars[1..4].iter().collect();
        let endpoint: String = chars[4..9].iter().collect();

        require_digits(raw, &transmission_type)?;
        require_digits(raw, &endpoint)?;

        let julian_day = format!("{:03}", clock.today_julian_day());

        Ok(Self {
            direction,
            transmission_type,
            endpoint,
            julian_day,
            sequence: 1,
        })
    }

    /// Renders the full 14-char form, e.g. `R1213456710001`.
    pub fn render(&self) -> String {
        format!(
            "{}{}{}{}{:02}",
            self.direction.as_char(),
            self.transmission_type,
            self.endpoint,
            self.julian_day,
            self.sequence
        )
    }

    /// Returns a copy of this Transmission ID with a different sequence
    /// number, as used by the receive-side sequence scan.
    pub fn with_sequence(&self, sequence: u8) -> Self {
        Self {
            sequence,
            ..self.clone()
        }
    }

    /// The `D ttt EEEEE` prefix used in not-found error messages.
    pub fn prefix(&self) -> String {
        format!(
            "{}{}{}",
            self.direction.as_char(),
            self.transmission_type,
            self.endpoint
        )
    }
}

fn require_digits(raw: &str, field: &str) -> Result<(), ProtocolError> {
    if field.chars().all(|c| c.is_ascii_digit()) {
        Ok(())
    } else {
        Err(ProtocolError::InvalidTxId {
            raw: raw.to_string(),
            reason: "numeric field contained a non-digit",
        })
    }
}
