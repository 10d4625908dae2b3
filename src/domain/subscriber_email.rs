use validator::validate_email;

const MAX_EMAIL_LENGTH: usize = 255;

/// Email address of a subscriber. Comparison is exact and case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(transparent)]
pub struct SubscriberEmail(String);

impl SubscriberEmail {
    pub fn parse(email: String) -> Result<SubscriberEmail, String> {
        if email.chars().count() > MAX_EMAIL_LENGTH {
            return Err(format!(
                "email is longer than {} characters",
                MAX_EMAIL_LENGTH
            ));
        }

        if !validate_email(&email) {
            return Err(format!("{} email is not valid", email));
        }

        Ok(Self(email))
    }

    /// Wraps an address read back from the table. Only the column bounds are checked, so a
    /// legacy row that predates validation still loads.
    pub fn from_stored(email: String) -> Result<SubscriberEmail, String> {
        if email.is_empty() || email.chars().count() > MAX_EMAIL_LENGTH {
            return Err(format!(
                "stored email must have between 1 and {} characters",
                MAX_EMAIL_LENGTH
            ));
        }

        Ok(Self(email))
    }
}

impl AsRef<str> for SubscriberEmail {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SubscriberEmail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}
