use rand::{seq::SliceRandom, Rng};

/// Famous titles offered as starting points on the landing page
pub const SUGGESTION_BOOKS: [&str; 20] = [
    "To Kill a Mockingbird",
    "1984",
    "Harry Potter and the Philosopher's Stone",
    "The Hobbit",
    "Pride and Prejudice",
    "The Da Vinci Code",
    "The Catcher in the Rye",
    "The Alchemist",
    "The Great Gatsby",
    "Moby Dick",
    "Crime and Punishment",
    "Brave New World",
    "Gone Girl",
    "The Shining",
    "The Girl with the Dragon Tattoo",
    "Thinking, Fast and Slow",
    "Twilight",
    "Moneyball",
    "Eat, Pray, Love",
    "Inferno",
];

pub const SUGGESTION_COUNT: usize = 5;

/// Five distinct titles drawn uniformly from the catalog
pub fn sample_suggestions<R: Rng + ?Sized>(rng: &mut R) -> Vec<&'static str> {
    SUGGESTION_BOOKS
        .choose_multiple(rng, SUGGESTION_COUNT)
        .copied()
        .collect()
}

pub fn suggestions() -> Vec<&'static str> {
    sample_suggestions(&mut rand::thread_rng())
}
