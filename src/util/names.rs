//! Guest name generator.
//!
//! Purely cosmetic: names are picked for players that join without a valid
//! nickname. The unseeded variant uses thread-local randomness and must never
//! be called from simulation code paths (determinism).

const ADJECTIVES: &[&str] = &[
    "Bouncy", "Sticky", "Springy", "Squishy", "Gooey",
    "Nimble", "Lazy", "Sneaky", "Cuddly", "Grumpy",
    "Green", "Blue", "Crimson", "Golden", "Rosy",
    "Big", "Tiny", "Round", "Chubby", "Skinny",
    "Jolly", "Gloomy", "Cheeky", "Humble", "Proud",
    "Brave", "Timid", "Sleepy", "Wild", "Cranky",
    "Swift", "Slow", "Quiet", "Loud", "Zippy",
    "Agile", "Clumsy", "Hungry", "Stuffed", "Greedy",
];

const NOUNS: &[&str] = &[
    "Slime", "Blob", "Splat", "Bubble", "Clump",
    "Jelly", "Puddle", "Droplet", "Gloop", "Custard",
    "Cat", "Pup", "Hamster", "Rabbit", "Hedgehog",
    "Fox", "Wolf", "Bear", "Raccoon", "Badger",
    "Donut", "Muffin", "Dumpling", "Tartlet", "Waffle",
    "Cookie", "Bun", "Marshmallow", "Pudding", "Toffee",
    "Bagel", "Sock", "Slipper", "Cactus", "Pickle",
    "Noodle", "Pretzel", "Pancake", "Biscuit", "Crumpet",
];

/// Deterministic name for a seed. One seed, one name.
pub fn generate_name(seed: u32) -> String {
    let mut hash = seed;
    let mut next = || {
        hash = hash.wrapping_mul(1_103_515_245).wrapping_add(12_345);
        hash
    };
    let adjective = ADJECTIVES[next() as usize % ADJECTIVES.len()];
    let noun = NOUNS[next() as usize % NOUNS.len()];
    format!("{} {}", adjective, noun)
}

/// Deterministic name avoiding collisions with `existing` names.
///
/// Falls back to a numeric suffix when all attempts collide.
pub fn generate_unique_name(seed: u32, existing: &[String]) -> String {
    const MAX_ATTEMPTS: usize = 100;

    let mut hash = seed;
    let mut next = || {
        hash = hash.wrapping_mul(1_103_515_245).wrapping_add(12_345);
        hash
    };

    for _ in 0..MAX_ATTEMPTS {
        let adjective = ADJECTIVES[next() as usize % ADJECTIVES.len()];
        let noun = NOUNS[next() as usize % NOUNS.len()];
        let name = format!("{} {}", adjective, noun);
        if !existing.contains(&name) {
            return name;
        }
    }

    let base = generate_name(seed);
    let mut suffix = 2;
    loop {
        let candidate = format!("{} {}", base, suffix);
        if !existing.contains(&candidate) {
            return candidate;
        }
        suffix += 1;
    }
}

/// Random name using thread-local entropy. Cosmetic use only.
pub fn generate_random_name() -> String {
    use rand::Rng;

    let mut rng = rand::thread_rng();
    let adjective = ADJECTIVES[rng.gen_range(0..ADJECTIVES.len())];
    let noun = NOUNS[rng.gen_range(0..NOUNS.len())];
    format!("{} {}", adjective, noun)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_name_is_deterministic() {
        assert_eq!(generate_name(42), generate_name(42));
        assert_ne!(generate_name(1), generate_name(999_999));
    }

    #[test]
    fn test_generated_names_pass_validation() {
        for seed in 0..200 {
            let name = generate_name(seed);
            assert!(
                crate::util::nickname::is_valid(&name),
                "{} should validate",
                name
            );
        }
    }

    #[test]
    fn test_unique_name_avoids_existing() {
        let taken = vec![generate_name(7)];
        let name = generate_unique_name(7, &taken);
        assert_ne!(name, taken[0]);
    }

    #[test]
    fn test_unique_name_suffix_fallback() {
        // Occupy every combination the generator can reach from this seed
        let mut taken: Vec<String> = Vec::new();
        for a in ADJECTIVES {
            for n in NOUNS {
                taken.push(format!("{} {}", a, n));
            }
        }
        let name = generate_unique_name(5, &taken);
        assert!(name.ends_with(" 2"), "unexpected fallback: {}", name);
    }

    #[test]
    fn test_random_name_shape() {
        let name = generate_random_name();
        assert!(name.contains(' '));
    }
}
