//! User records as served by `GET /users`.

use serde::{Deserialize, Serialize};

use super::Id;

/// An author of posts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Id,
    pub name: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub company: Company,
}

/// The company a user works for.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub catch_phrase: String,
}

impl User {
    /// `Author: {name} with {company}` line shown under each post.
    pub fn byline(&self) -> String {
        format!("Author: {} with {}", self.name, self.company.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_upstream_shape() {
        let json = r#"{
            "id": 3,
            "name": "Clementine Bauch",
            "username": "Samantha",
            "email": "Nathan@yesenia.net",
            "address": { "city": "McKenziehaven" },
            "company": {
                "name": "Romaguera-Jacobson",
                "catchPhrase": "Face to face bifurcated interface",
                "bs": "e-enable strategic applications"
            }
        }"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert_eq!(user.id, 3);
        assert_eq!(user.company.catch_phrase, "Face to face bifurcated interface");
    }

    #[test]
    fn tolerates_missing_optional_fields() {
        let user: User = serde_json::from_str(r#"{"id": 1, "name": "Ann"}"#).unwrap();
        assert_eq!(user.company, Company::default());
        assert!(user.email.is_empty());
    }

    #[test]
    fn byline_names_company() {
        let user = User {
            id: 3,
            name: "Ann".into(),
            username: String::new(),
            email: String::new(),
            company: Company {
                name: "Acme".into(),
                catch_phrase: "Go go".into(),
            },
        };
        assert_eq!(user.byline(), "Author: Ann with Acme");
    }
}
