/// User-related answers.
#[derive(Debug, Clone, Copy, Default)]
pub struct Users;

impl Users {
    pub const TYPICAL_ANSWER: &'static str = "Just a typical answer.";

    /// Returns the typical message, nothing interesting
    pub fn typical_answer(&self) -> &'static str {
        Self::TYPICAL_ANSWER
    }
}

#[cfg(test)]
mod tests {
    use super::Users;

    #[test]
    fn test_typical_answer() {
        assert_eq!(Users.typical_answer(), "Just a typical answer.");
    }
}
