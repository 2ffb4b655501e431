// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Core identity and amount types shared by records, balances and settlements.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Signed integer amount used for both debts and net balances.
///
/// Debt amounts are never negative; a net [`Balance`](crate::Balance) entry
/// is negative for a debtor and positive for a creditor.
pub type Amount = i64;

/// Identity of a participant in a debt group.
///
/// Comparison is exact and case-sensitive: `"Kasia"` and `"kasia"` are two
/// different participants.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Participant(pub String);

impl Participant {
    pub fn new(name: impl Into<String>) -> Self {
        Participant(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Participant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Participant {
    fn from(name: &str) -> Self {
        Participant(name.to_owned())
    }
}

impl From<String> for Participant {
    fn from(name: String) -> Self {
        Participant(name)
    }
}

impl Borrow<str> for Participant {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Participant {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::Participant;
    use std::collections::HashMap;

    #[test]
    fn identity_is_case_sensitive() {
        assert_ne!(Participant::from("Kasia"), Participant::from("kasia"));
        assert_eq!(Participant::from("Michał"), Participant::new(String::from("Michał")));
    }

    #[test]
    fn lookup_by_str() {
        let mut map = HashMap::new();
        map.insert(Participant::from("Jacek"), 1);
        assert_eq!(map.get("Jacek"), Some(&1));
        assert_eq!(map.get("jacek"), None);
    }

    #[test]
    fn displays_raw_identity() {
        assert_eq!(Participant::from("Dominik").to_string(), "Dominik");
    }
}
