/// Cat-related answers.
#[derive(Debug, Clone, Copy, Default)]
pub struct Cats;

impl Cats {
    pub const MEOW: &'static str = "Meow!";

    pub fn meow(&self) -> &'static str {
        Self::MEOW
    }
}

#[cfg(test)]
mod tests {
    use super::Cats;

    #[test]
    fn test_meow_is_stable() {
        assert_eq!(Cats.meow(), "Meow!");
        assert_eq!(Cats.meow(), Cats.meow());
    }
}
