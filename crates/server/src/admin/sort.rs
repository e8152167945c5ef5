//! Column sort for the admin registrations table.

use serde::Deserialize;
use std::cmp::Ordering;

use crate::core::models::Registration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortColumn {
    Id,
    Name,
    Email,
    Team,
    Experience,
    CreatedAt,
}

impl SortColumn {
    pub const ALL: [SortColumn; 6] = [
        SortColumn::Id,
        SortColumn::Name,
        SortColumn::Email,
        SortColumn::Team,
        SortColumn::Experience,
        SortColumn::CreatedAt,
    ];

    pub fn parse(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.key() == key)
    }

    pub fn key(&self) -> &'static str {
        match self {
            SortColumn::Id => "id",
            SortColumn::Name => "name",
            SortColumn::Email => "email",
            SortColumn::Team => "team",
            SortColumn::Experience => "experience",
            SortColumn::CreatedAt => "created_at",
        }
    }

    pub fn header(&self) -> &'static str {
        match self {
            SortColumn::Id => "ID",
            SortColumn::Name => "Name",
            SortColumn::Email => "Email",
            SortColumn::Team => "Team",
            SortColumn::Experience => "Experience",
            SortColumn::CreatedAt => "Registration Date",
        }
    }

    fn compare(&self, a: &Registration, b: &Registration) -> Ordering {
        match self {
            SortColumn::Id => a.id.cmp(&b.id),
            SortColumn::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
            SortColumn::Email => a.email.to_lowercase().cmp(&b.email.to_lowercase()),
            SortColumn::Team => a.team.cmp(&b.team),
            SortColumn::Experience => a.experience.cmp(&b.experience),
            SortColumn::CreatedAt => a.created_at.cmp(&b.created_at),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn key(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }

    pub fn flipped(&self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

/// Raw `?sort=&dir=` query. Unknown values fall back to server order.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SortParams {
    pub sort: Option<String>,
    pub dir: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistrationSort {
    pub column: SortColumn,
    pub direction: SortDirection,
}

impl RegistrationSort {
    pub fn from_params(params: &SortParams) -> Option<Self> {
        let column = SortColumn::parse(params.sort.as_deref()?)?;
        let direction = match params.dir.as_deref() {
            Some("desc") => SortDirection::Desc,
            _ => SortDirection::Asc,
        };
        Some(Self { column, direction })
    }

    /// Stable: rows that compare equal keep server order.
    pub fn apply(&self, rows: &mut [Registration]) {
        rows.sort_by(|a, b| {
            let ordering = self.column.compare(a, b);
            match self.direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            }
        });
    }

    /// Query string for a header link: clicking the active column flips it.
    pub fn toggle_query(current: Option<Self>, column: SortColumn) -> String {
        let direction = match current {
            Some(s) if s.column == column => s.direction.flipped(),
            _ => SortDirection::Asc,
        };
        format!("?sort={}&dir={}", column.key(), direction.key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn reg(id: &str, name: &str, team: Option<&str>, day: u32) -> Registration {
        Registration {
            id: id.into(),
            name: name.into(),
            email: format!("{}@x.io", id),
            team: team.map(str::to_string),
            experience: None,
            created_at: Some(Utc.with_ymd_and_hms(2025, 3, day, 12, 0, 0).unwrap()),
        }
    }

    fn ids(rows: &[Registration]) -> Vec<&str> {
        rows.iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn test_params_parse() {
        let params = SortParams {
            sort: Some("name".into()),
            dir: Some("desc".into()),
        };
        assert_eq!(
            RegistrationSort::from_params(&params),
            Some(RegistrationSort {
                column: SortColumn::Name,
                direction: SortDirection::Desc
            })
        );
        assert_eq!(RegistrationSort::from_params(&SortParams::default()), None);
        let bogus = SortParams {
            sort: Some("password".into()),
            dir: None,
        };
        assert_eq!(RegistrationSort::from_params(&bogus), None);
    }

    #[test]
    fn test_sort_by_name_case_insensitive() {
        let mut rows = vec![reg("1", "bob", None, 1), reg("2", "Alice", None, 2)];
        RegistrationSort {
            column: SortColumn::Name,
            direction: SortDirection::Asc,
        }
        .apply(&mut rows);
        assert_eq!(ids(&rows), ["2", "1"]);
    }

    #[test]
    fn test_sort_desc_and_stability() {
        let mut rows = vec![
            reg("a", "x", Some("T1"), 3),
            reg("b", "y", None, 1),
            reg("c", "z", Some("T1"), 2),
        ];
        RegistrationSort {
            column: SortColumn::Team,
            direction: SortDirection::Asc,
        }
        .apply(&mut rows);
        assert_eq!(ids(&rows), ["b", "a", "c"]);

        RegistrationSort {
            column: SortColumn::CreatedAt,
            direction: SortDirection::Desc,
        }
        .apply(&mut rows);
        assert_eq!(ids(&rows), ["a", "c", "b"]);
    }

    #[test]
    fn test_toggle_query() {
        let current = Some(RegistrationSort {
            column: SortColumn::Email,
            direction: SortDirection::Asc,
        });
        assert_eq!(
            RegistrationSort::toggle_query(current, SortColumn::Email),
            "?sort=email&dir=desc"
        );
        assert_eq!(
            RegistrationSort::toggle_query(current, SortColumn::Id),
            "?sort=id&dir=asc"
        );
    }
}
