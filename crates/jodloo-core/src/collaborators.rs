//! Budget collaborators and access levels
//!
//! A budget is shared between users with one of three access levels. Every
//! collaborator list has exactly one owner; the invariant is checked on
//! construction, on every mutation and when a list is deserialized.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Access level of a user on a shared budget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessLevel {
    Owner,
    Editor,
    Viewer,
}

impl AccessLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::Editor => "editor",
            Self::Viewer => "viewer",
        }
    }

    pub fn can_edit(&self) -> bool {
        matches!(self, Self::Owner | Self::Editor)
    }
}

impl std::str::FromStr for AccessLevel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "owner" => Ok(Self::Owner),
            "editor" => Ok(Self::Editor),
            "viewer" => Ok(Self::Viewer),
            _ => Err(format!("Unknown access level: {}", s)),
        }
    }
}

impl std::fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collaborator {
    pub user: String,
    pub access_level: AccessLevel,
}

/// Collaborators of one budget, exactly one of them the owner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Collaborator>", into = "Vec<Collaborator>")]
pub struct Collaborators(Vec<Collaborator>);

impl Collaborators {
    /// The creator becomes the owner; invited users default to viewer.
    ///
    /// The creator may appear in `invited` and is skipped there. Inviting
    /// anyone else as owner, or the same user twice, is rejected.
    pub fn new(owner: &str, invited: &[(&str, Option<AccessLevel>)]) -> Result<Self> {
        let mut collaborators = Self(vec![Collaborator {
            user: owner.to_string(),
            access_level: AccessLevel::Owner,
        }]);

        for (user, role) in invited {
            if *user == owner {
                continue;
            }
            collaborators.add(user, role.unwrap_or(AccessLevel::Viewer))?;
        }

        Ok(collaborators)
    }

    pub fn owner(&self) -> &str {
        self.0
            .iter()
            .find(|c| c.access_level == AccessLevel::Owner)
            .map(|c| c.user.as_str())
            .unwrap_or_default()
    }

    pub fn role_of(&self, user: &str) -> Option<AccessLevel> {
        self.0
            .iter()
            .find(|c| c.user == user)
            .map(|c| c.access_level)
    }

    pub fn can_view(&self, user: &str) -> bool {
        self.role_of(user).is_some()
    }

    pub fn can_edit(&self, user: &str) -> bool {
        self.role_of(user).is_some_and(|r| r.can_edit())
    }

    pub fn add(&mut self, user: &str, access_level: AccessLevel) -> Result<()> {
        if access_level == AccessLevel::Owner {
            return Err(Error::Collaborator(format!(
                "{} cannot be added as owner; a budget has exactly one owner",
                user
            )));
        }
        if self.can_view(user) {
            return Err(Error::Collaborator(format!(
                "{} is already a collaborator",
                user
            )));
        }
        self.0.push(Collaborator {
            user: user.to_string(),
            access_level,
        });
        Ok(())
    }

    pub fn remove(&mut self, user: &str) -> Result<()> {
        match self.role_of(user) {
            None => Err(Error::NotFound(format!("Collaborator {}", user))),
            Some(AccessLevel::Owner) => Err(Error::Collaborator(
                "The owner cannot be removed from a budget".into(),
            )),
            Some(_) => {
                self.0.retain(|c| c.user != user);
                Ok(())
            }
        }
    }

    /// Hand ownership to an existing collaborator; the old owner becomes an editor
    pub fn transfer_ownership(&mut self, to: &str) -> Result<()> {
        if !self.can_view(to) {
            return Err(Error::NotFound(format!("Collaborator {}", to)));
        }
        for c in &mut self.0 {
            if c.user == to {
                c.access_level = AccessLevel::Owner;
            } else if c.access_level == AccessLevel::Owner {
                c.access_level = AccessLevel::Editor;
            }
        }
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Collaborator> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl TryFrom<Vec<Collaborator>> for Collaborators {
    type Error = Error;

    fn try_from(list: Vec<Collaborator>) -> Result<Self> {
        let owners = list
            .iter()
            .filter(|c| c.access_level == AccessLevel::Owner)
            .count();
        if owners != 1 {
            return Err(Error::Collaborator(format!(
                "A budget must have exactly one owner, found {}",
                owners
            )));
        }
        for (i, c) in list.iter().enumerate() {
            if list[..i].iter().any(|other| other.user == c.user) {
                return Err(Error::Collaborator(format!(
                    "{} is listed more than once",
                    c.user
                )));
            }
        }
        Ok(Self(list))
    }
}

impl From<Collaborators> for Vec<Collaborator> {
    fn from(collaborators: Collaborators) -> Self {
        collaborators.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owner_count(c: &Collaborators) -> usize {
        c.iter()
            .filter(|c| c.access_level == AccessLevel::Owner)
            .count()
    }

    #[test]
    fn test_new_assigns_owner_and_default_viewer() {
        let c = Collaborators::new(
            "asha",
            &[
                ("ravi", Some(AccessLevel::Editor)),
                ("meera", None),
                ("asha", Some(AccessLevel::Viewer)),
            ],
        )
        .unwrap();

        assert_eq!(c.len(), 3);
        assert_eq!(c.owner(), "asha");
        assert_eq!(c.role_of("asha"), Some(AccessLevel::Owner));
        assert_eq!(c.role_of("ravi"), Some(AccessLevel::Editor));
        assert_eq!(c.role_of("meera"), Some(AccessLevel::Viewer));
        assert_eq!(owner_count(&c), 1);
    }

    #[test]
    fn test_second_owner_rejected() {
        let result = Collaborators::new("asha", &[("ravi", Some(AccessLevel::Owner))]);
        assert!(matches!(result, Err(Error::Collaborator(_))));
    }

    #[test]
    fn test_duplicate_invite_rejected() {
        let result = Collaborators::new("asha", &[("ravi", None), ("ravi", None)]);
        assert!(matches!(result, Err(Error::Collaborator(_))));
    }

    #[test]
    fn test_permissions() {
        let c = Collaborators::new(
            "asha",
            &[("ravi", Some(AccessLevel::Editor)), ("meera", None)],
        )
        .unwrap();

        assert!(c.can_edit("asha"));
        assert!(c.can_edit("ravi"));
        assert!(!c.can_edit("meera"));
        assert!(c.can_view("meera"));
        assert!(!c.can_view("stranger"));
    }

    #[test]
    fn test_remove() {
        let mut c = Collaborators::new("asha", &[("ravi", None)]).unwrap();
        assert!(c.remove("asha").is_err());
        assert!(matches!(c.remove("nobody"), Err(Error::NotFound(_))));
        c.remove("ravi").unwrap();
        assert_eq!(c.len(), 1);
        assert_eq!(owner_count(&c), 1);
    }

    #[test]
    fn test_transfer_ownership() {
        let mut c = Collaborators::new("asha", &[("ravi", None)]).unwrap();
        c.transfer_ownership("ravi").unwrap();

        assert_eq!(c.owner(), "ravi");
        assert_eq!(c.role_of("asha"), Some(AccessLevel::Editor));
        assert_eq!(owner_count(&c), 1);
        assert!(c.transfer_ownership("nobody").is_err());
    }

    #[test]
    fn test_deserialize_validates_single_owner() {
        let ok: Collaborators = serde_json::from_str(
            r#"[{"user":"asha","access_level":"owner"},{"user":"ravi","access_level":"viewer"}]"#,
        )
        .unwrap();
        assert_eq!(ok.owner(), "asha");

        let no_owner = serde_json::from_str::<Collaborators>(
            r#"[{"user":"ravi","access_level":"viewer"}]"#,
        );
        assert!(no_owner.is_err());

        let two_owners = serde_json::from_str::<Collaborators>(
            r#"[{"user":"asha","access_level":"owner"},{"user":"ravi","access_level":"owner"}]"#,
        );
        assert!(two_owners.is_err());
    }

    #[test]
    fn test_serialize_as_list() {
        let c = Collaborators::new("asha", &[]).unwrap();
        let json = serde_json::to_string(&c).unwrap();
        assert_eq!(json, r#"[{"user":"asha","access_level":"owner"}]"#);
    }
}
