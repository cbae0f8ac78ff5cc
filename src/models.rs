use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// ============ Database Models ============

/// A stored person record.
///
/// Derived attributes (`age`, `gender`, `nationality`) hold their zero value
/// when enrichment did not produce them.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Person {
    /// Identifier assigned by the database on insert.
    pub id: i32,
    pub name: String,
    pub surname: String,
    /// Empty when the person has none.
    pub patronymic: String,
    pub age: i32,
    pub gender: String,
    /// Country code, e.g. "RU".
    pub nationality: String,
}

/// The six mutable columns of a person, i.e. everything except `id`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonFields {
    pub name: String,
    pub surname: String,
    pub patronymic: String,
    pub age: i32,
    pub gender: String,
    pub nationality: String,
}

impl PersonFields {
    /// A draft with only the name parts set, ready for enrichment.
    pub fn draft(name: &str, surname: &str, patronymic: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            surname: surname.to_string(),
            patronymic: patronymic.unwrap_or_default().to_string(),
            ..Self::default()
        }
    }

    pub fn with_id(self, id: i32) -> Person {
        Person {
            id,
            name: self.name,
            surname: self.surname,
            patronymic: self.patronymic,
            age: self.age,
            gender: self.gender,
            nationality: self.nationality,
        }
    }
}

impl From<Person> for PersonFields {
    fn from(p: Person) -> Self {
        Self {
            name: p.name,
            surname: p.surname,
            patronymic: p.patronymic,
            age: p.age,
            gender: p.gender,
            nationality: p.nationality,
        }
    }
}

// ============ API Request/Response Models ============

/// Body of `POST /person`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePersonRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub surname: String,
    #[serde(default)]
    pub patronymic: Option<String>,
}

impl CreatePersonRequest {
    /// Checks the required fields, returning the first problem found.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("field name is a required field".to_string());
        }
        if self.surname.trim().is_empty() {
            return Err("field surname is a required field".to_string());
        }
        Ok(())
    }

    pub fn patronymic(&self) -> Option<&str> {
        self.patronymic.as_deref().filter(|p| !p.is_empty())
    }
}

/// Success body of `POST /person`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePersonResponse {
    pub status: String,
    pub id: i32,
}

/// Body of `PUT /person/:id`. Missing fields replace the stored value with
/// their zero value.
pub type UpdatePersonRequest = PersonFields;

/// Generic `{"status": "OK"}` body for operations without a payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
}

impl StatusResponse {
    pub fn ok() -> Self {
        Self {
            status: "OK".to_string(),
        }
    }
}

// ============ Enrichment Models ============

/// Answer of the age inference service.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AgeResponse {
    #[serde(default)]
    pub count: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    /// `null` when the service has no estimate for the name.
    #[serde(default)]
    pub age: Option<i32>,
}

/// Answer of the gender inference service.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GenderResponse {
    #[serde(default)]
    pub count: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub probability: Option<f64>,
}

/// One candidate country of the nationality inference service.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CountryCandidate {
    pub country_id: String,
    pub probability: f64,
}

/// Answer of the nationality inference service.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NationalityResponse {
    #[serde(default)]
    pub count: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub country: Vec<CountryCandidate>,
}
