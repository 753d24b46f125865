use log::{debug, info, warn};
use rand::{seq::SliceRandom, Rng};
use std::{
    collections::HashSet,
    fs,
    io::{self, BufRead, Write},
    path::Path,
};

use crate::{
    console::Console,
    error::{RulesError, SessionError},
};

pub const CLASSIC: [&str; 3] = ["rock", "paper", "scissors"];

/// Which option beats which, kept in the order the options were given.
#[derive(Clone, PartialEq, Debug)]
pub struct Rules {
    options: Vec<String>,
    beats: Vec<Vec<String>>,
}

impl Rules {
    /// Every option beats the half of the list that precedes it, wrapping
    /// around, so each option wins against exactly as many as it loses to.
    pub fn generate<S: AsRef<str>>(options: &[S]) -> Result<Self, RulesError> {
        let options: Vec<String> = options.iter().map(|o| o.as_ref().trim().to_string()).collect();

        if options.is_empty() {
            return Err(RulesError::Empty);
        }
        if options.iter().any(|o| o.is_empty()) {
            return Err(RulesError::Blank);
        }
        let mut seen = HashSet::new();
        if let Some(dup) = options.iter().find(|o| !seen.insert(o.as_str())) {
            return Err(RulesError::Duplicate(dup.clone()));
        }
        if options.len() % 2 == 0 {
            return Err(RulesError::EvenCount(options.len()));
        }

        let len = options.len();
        let beats = (0..len)
            .map(|i| {
                (1..=len / 2)
                    .map(|k| options[(i + len - k) % len].clone())
                    .collect()
            })
            .collect();

        Ok(Self { options, beats })
    }

    pub fn classic() -> Self {
        let len = CLASSIC.len();
        Self {
            options: CLASSIC.iter().map(|o| o.to_string()).collect(),
            beats: (0..len)
                .map(|i| vec![CLASSIC[(i + len - 1) % len].to_string()])
                .collect(),
        }
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    pub fn contains(&self, option: &str) -> bool {
        self.position(option).is_some()
    }

    /// Options that `option` wins against; empty for an unknown option.
    pub fn beaten_by(&self, option: &str) -> &[String] {
        match self.position(option) {
            Some(i) => &self.beats[i],
            None => &[],
        }
    }

    pub fn beats(&self, winner: &str, loser: &str) -> bool {
        self.beaten_by(winner).iter().any(|o| o == loser)
    }

    pub fn judge(&self, user: &str, computer: &str) -> Outcome {
        if user == computer {
            Outcome::Draw
        } else if self.beats(user, computer) {
            Outcome::Win
        } else {
            Outcome::Loss
        }
    }

    fn position(&self, option: &str) -> Option<usize> {
        self.options.iter().position(|o| o == option)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Outcome {
    Win,
    Draw,
    Loss,
}

impl Outcome {
    pub fn points(&self) -> u32 {
        match self {
            Outcome::Win => 100,
            Outcome::Draw => 50,
            Outcome::Loss => 0,
        }
    }
}

// the points are the last field, so names may contain spaces
fn split_rating(line: &str) -> Option<(&str, &str)> {
    line.trim()
        .rsplit_once(char::is_whitespace)
        .map(|(name, points)| (name.trim_end(), points))
}

/// Reads `name points` lines and returns the points for `name`, or 0 when
/// the name is not listed. Malformed lines are skipped.
pub fn rating_for<R: BufRead>(reader: R, name: &str) -> io::Result<u32> {
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match split_rating(&line).map(|(n, points)| (n, points.parse::<u32>())) {
            Some((n, Ok(points))) if n == name => return Ok(points),
            Some((_, Ok(_))) => {}
            _ => warn!("skipping malformed rating line {:?}", line),
        }
    }
    Ok(0)
}

pub fn load_rating(path: &Path, name: &str) -> io::Result<u32> {
    match fs::File::open(path) {
        Ok(file) => rating_for(io::BufReader::new(file), name),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            info!("{} does not exist, starting {} at 0", path.display(), name);
            Ok(0)
        }
        Err(e) => Err(e),
    }
}

/// Replaces the line for `name`, or appends one, keeping every other line.
pub fn store_rating(path: &Path, name: &str, rating: u32) -> io::Result<()> {
    let existing = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == io::ErrorKind::NotFound => String::new(),
        Err(e) => return Err(e),
    };

    let mut lines: Vec<String> = existing
        .lines()
        .filter(|line| split_rating(line).map(|(n, _)| n) != Some(name))
        .map(str::to_string)
        .collect();
    lines.push(format!("{} {}", name, rating));

    fs::write(path, lines.join("\n") + "\n")
}

/// Plays rounds until `!exit` and returns the final rating.
pub fn play<R, W, G>(
    console: &mut Console<R, W>,
    rules: &Rules,
    mut rating: u32,
    rng: &mut G,
) -> Result<u32, SessionError>
where
    R: BufRead,
    W: Write,
    G: Rng + ?Sized,
{
    loop {
        let input = console.ask("> ")?;
        match input.as_str() {
            "!exit" => {
                console.say("Bye!")?;
                return Ok(rating);
            }
            "!rules" => {
                for option in rules.options() {
                    console.say(format!(
                        "{} can beat: {}",
                        option,
                        rules.beaten_by(option).join(", ")
                    ))?;
                }
            }
            "!rating" => console.say(format!("Your rating is {}!", rating))?,
            user if rules.contains(user) => {
                let computer = rules
                    .options()
                    .choose(rng)
                    .map(String::as_str)
                    .unwrap_or(user);
                let outcome = rules.judge(user, computer);
                debug!("{} against {}: {:?}", user, computer, outcome);

                match outcome {
                    Outcome::Win => console.say(format!(
                        "Well done. The computer chose {} and failed",
                        computer
                    ))?,
                    Outcome::Draw => console.say(format!("There is a draw ({})", user))?,
                    Outcome::Loss => {
                        console.say(format!("Sorry, but the computer chose {}", computer))?
                    }
                }
                rating = rating.saturating_add(outcome.points());
            }
            _ => console.say("Incorrect input.")?,
        }
    }
}

/// The whole game: greeting, rule setup, rounds, and saving the rating.
pub fn run<R, W, G>(
    console: &mut Console<R, W>,
    ratings: &Path,
    rng: &mut G,
) -> Result<u32, SessionError>
where
    R: BufRead,
    W: Write,
    G: Rng + ?Sized,
{
    let name = console.ask_until("Enter your name: > ", |answer| {
        if answer.is_empty() {
            Err("The name must not be empty".to_string())
        } else {
            Ok(answer.to_string())
        }
    })?;
    console.say(format!("Hello, {}", name))?;

    let options = console.ask("Enter the options in format \"rock,paper,scissors\": > ")?;
    let rules = if options.trim().is_empty() {
        Rules::classic()
    } else {
        let listed: Vec<&str> = options.split(',').collect();
        match Rules::generate(&listed) {
            Ok(rules) => rules,
            Err(e) => {
                console.say(format!("{}, playing rock, paper, scissors instead", e))?;
                Rules::classic()
            }
        }
    };
    console.say("Okay, let's start")?;

    let rating = load_rating(ratings, &name)?;
    let rating = play(console, &rules, rating, rng)?;
    store_rating(ratings, &name, rating)?;
    Ok(rating)
}

#[cfg(test)]
mod tests {
    use super::{load_rating, play, rating_for, run, store_rating, Outcome, Rules, CLASSIC};
    use crate::{console::Console, error::RulesError};
    use rand::{rngs::StdRng, SeedableRng};
    use std::fs;
    use test_log::test;

    #[test]
    fn test_classic_rules() {
        let rules = Rules::classic();
        assert_eq!(Rules::generate(&CLASSIC), Ok(rules.clone()));

        assert_eq!(rules.beaten_by("rock"), ["scissors"]);
        assert_eq!(rules.beaten_by("paper"), ["rock"]);
        assert_eq!(rules.beaten_by("scissors"), ["paper"]);
        assert_eq!(rules.judge("rock", "scissors"), Outcome::Win);
        assert_eq!(rules.judge("rock", "paper"), Outcome::Loss);
        assert_eq!(rules.judge("paper", "paper"), Outcome::Draw);
    }

    #[test]
    fn test_generated_rules() {
        let options = [
            "rock", "gun", "lightning", "devil", "dragon", "water", "air", "paper", "sponge",
            "wolf", "tree", "human", "snake", "scissors", "fire",
        ];
        let rules = Rules::generate(&options).unwrap();

        // each option beats the seven listed before it
        assert_eq!(
            rules.beaten_by("rock"),
            ["fire", "scissors", "snake", "human", "tree", "wolf", "sponge"]
        );
        assert_eq!(
            rules.beaten_by("water"),
            ["dragon", "devil", "lightning", "gun", "rock", "fire", "scissors"]
        );
        assert!(rules.beats("gun", "rock"));
        assert!(!rules.beats("rock", "gun"));

        for a in rules.options() {
            assert_eq!(rules.beaten_by(a).len(), 7);
            for b in rules.options() {
                if a != b {
                    assert_ne!(rules.beats(a, b), rules.beats(b, a));
                }
            }
        }
    }

    #[test]
    fn test_invalid_rules() {
        assert_eq!(Rules::generate::<&str>(&[]), Err(RulesError::Empty));
        assert_eq!(Rules::generate(&["a", "", "b"]), Err(RulesError::Blank));
        assert_eq!(
            Rules::generate(&["a", "b", "a"]),
            Err(RulesError::Duplicate("a".to_string()))
        );
        assert_eq!(
            Rules::generate(&["a", "b", "c", "d"]),
            Err(RulesError::EvenCount(4))
        );
        assert!(Rules::generate(&["solo"]).unwrap().beaten_by("solo").is_empty());
    }

    #[test]
    fn test_points() {
        assert_eq!(Outcome::Win.points(), 100);
        assert_eq!(Outcome::Draw.points(), 50);
        assert_eq!(Outcome::Loss.points(), 0);
    }

    #[test]
    fn test_rating_for() {
        let file = "Tim 350\nJane 200\nbroken\nAlex many\n\nMax 0\n";
        assert_eq!(rating_for(file.as_bytes(), "Jane").unwrap(), 200);
        assert_eq!(rating_for(file.as_bytes(), "Max").unwrap(), 0);
        assert_eq!(rating_for(file.as_bytes(), "Alex").unwrap(), 0);
        assert_eq!(rating_for(file.as_bytes(), "Nobody").unwrap(), 0);
    }

    #[test]
    fn test_names_with_spaces() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rating.txt");

        store_rating(&path, "Ann Lee", 300).unwrap();
        store_rating(&path, "Ann", 50).unwrap();
        store_rating(&path, "Ann Lee", 400).unwrap();

        assert_eq!(load_rating(&path, "Ann Lee").unwrap(), 400);
        assert_eq!(load_rating(&path, "Ann").unwrap(), 50);
        assert_eq!(fs::read_to_string(&path).unwrap(), "Ann 50\nAnn Lee 400\n");
    }

    #[test]
    fn test_rating_saturates() {
        let input = format!("{}!exit\n", "rock\n".repeat(6));
        let mut console = Console::new(input.as_bytes(), Vec::new());
        let mut rng = StdRng::seed_from_u64(7);

        let rating = play(&mut console, &Rules::classic(), u32::MAX - 10, &mut rng).unwrap();
        let output = String::from_utf8(console.into_output()).unwrap();
        if output.contains("and failed") || output.contains("There is a draw") {
            assert_eq!(rating, u32::MAX);
        } else {
            assert_eq!(rating, u32::MAX - 10);
        }
    }

    #[test]
    fn test_store_rating() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rating.txt");

        assert_eq!(load_rating(&path, "Tim").unwrap(), 0);
        store_rating(&path, "Tim", 350).unwrap();
        store_rating(&path, "Jane", 200).unwrap();
        store_rating(&path, "Tim", 450).unwrap();

        assert_eq!(load_rating(&path, "Tim").unwrap(), 450);
        assert_eq!(load_rating(&path, "Jane").unwrap(), 200);
        assert_eq!(fs::read_to_string(&path).unwrap(), "Jane 200\nTim 450\n");
    }

    #[test]
    fn test_play_scores_rounds() {
        let rules = Rules::classic();
        let mut console = Console::new("rock\nrock\nrock\nrock\nlizard\n!rating\n!exit\n".as_bytes(), Vec::new());
        let mut rng = StdRng::seed_from_u64(7);

        let rating = play(&mut console, &rules, 1000, &mut rng).unwrap();
        let output = String::from_utf8(console.into_output()).unwrap();

        let wins = output.matches("and failed").count() as u32;
        let draws = output.matches("There is a draw (rock)").count() as u32;
        let losses = output.matches("Sorry, but the computer chose paper").count() as u32;
        assert_eq!(wins + draws + losses, 4);
        assert_eq!(rating, 1000 + 100 * wins + 50 * draws);

        assert!(output.contains("Incorrect input.\n"));
        assert!(output.contains(&format!("Your rating is {}!\n", rating)));
        assert!(output.ends_with("> Bye!\n"));
    }

    #[test]
    fn test_rules_command() {
        let rules = Rules::generate(&["rock", "paper", "scissors", "lizard", "spock"]).unwrap();
        let mut console = Console::new("!rules\n!exit\n".as_bytes(), Vec::new());
        let mut rng = StdRng::seed_from_u64(1);

        assert_eq!(play(&mut console, &rules, 0, &mut rng).unwrap(), 0);
        let output = String::from_utf8(console.into_output()).unwrap();
        assert!(output.contains("rock can beat: spock, lizard\n"));
        assert!(output.contains("paper can beat: rock, spock\n"));
    }

    #[test]
    fn test_run_saves_rating() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rating.txt");
        fs::write(&path, "Ann 300\n").unwrap();

        let mut console = Console::new("Ann\nrock,gun,lightning,devil,dragon\n!rating\ndragon\n!exit\n".as_bytes(), Vec::new());
        let mut rng = StdRng::seed_from_u64(42);
        let rating = run(&mut console, &path, &mut rng).unwrap();

        let output = String::from_utf8(console.into_output()).unwrap();
        assert!(output.contains("Hello, Ann\n"));
        assert!(output.contains("Okay, let's start\n"));
        assert!(output.contains("Your rating is 300!\n"));
        assert!(rating >= 300);
        assert_eq!(load_rating(&path, "Ann").unwrap(), rating);
    }

    #[test]
    fn test_run_falls_back_to_classic() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rating.txt");

        let mut console = Console::new("Bo\na,b\n!rules\n!exit\n".as_bytes(), Vec::new());
        let mut rng = StdRng::seed_from_u64(3);
        run(&mut console, &path, &mut rng).unwrap();

        let output = String::from_utf8(console.into_output()).unwrap();
        assert!(output.contains("an odd number of options is required, got 2"));
        assert!(output.contains("rock can beat: scissors\n"));
    }
}
