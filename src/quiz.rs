use log::debug;
use rand::{seq::SliceRandom, Rng};
use std::{
    fmt, fs,
    io::{BufRead, Write},
    path::Path,
};

use crate::{console::Console, error::SessionError};

pub const TASKS: u32 = 5;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Level {
    Simple,
    Hard,
}

impl Level {
    pub fn number(&self) -> u8 {
        match self {
            Level::Simple => 1,
            Level::Hard => 2,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Level::Simple => "simple operations with numbers 2-9",
            Level::Hard => "integral squares of 11-29",
        }
    }

    fn from_answer(answer: &str) -> Result<Level, String> {
        match answer.parse::<u8>() {
            Ok(1) => Ok(Level::Simple),
            Ok(2) => Ok(Level::Hard),
            _ => Err("Incorrect format.".to_string()),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Operator {
    Add,
    Sub,
    Mul,
}

const OPERATORS: [Operator; 3] = [Operator::Add, Operator::Sub, Operator::Mul];

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operator::Add => write!(f, "+"),
            Operator::Sub => write!(f, "-"),
            Operator::Mul => write!(f, "*"),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Task {
    Arithmetic { lhs: i64, op: Operator, rhs: i64 },
    Square(i64),
}

impl Task {
    pub fn random<G: Rng + ?Sized>(level: Level, rng: &mut G) -> Self {
        match level {
            Level::Simple => Task::Arithmetic {
                lhs: rng.gen_range(2..=9),
                op: *OPERATORS.choose(rng).unwrap_or(&Operator::Add),
                rhs: rng.gen_range(2..=9),
            },
            Level::Hard => Task::Square(rng.gen_range(11..=29)),
        }
    }

    pub fn answer(&self) -> i64 {
        match *self {
            Task::Arithmetic { lhs, op, rhs } => match op {
                Operator::Add => lhs + rhs,
                Operator::Sub => lhs - rhs,
                Operator::Mul => lhs * rhs,
            },
            Task::Square(n) => n * n,
        }
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Task::Arithmetic { lhs, op, rhs } => write!(f, "{} {} {}", lhs, op, rhs),
            Task::Square(n) => write!(f, "{}", n),
        }
    }
}

/// A saved result line, e.g. `Ann: 4/5 in level 1 (simple operations with numbers 2-9).`
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct QuizRecord {
    pub name: String,
    pub score: u32,
    pub tasks: u32,
    pub level: Level,
}

impl fmt::Display for QuizRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {}/{} in level {} ({}).",
            self.name,
            self.score,
            self.tasks,
            self.level.number(),
            self.level.description()
        )
    }
}

fn integer(answer: &str) -> Result<i64, String> {
    answer
        .parse()
        .map_err(|_| "Wrong format! Try again.".to_string())
}

/// Asks `count` questions of `level` and returns how many were right.
pub fn take_test<R, W, G>(
    console: &mut Console<R, W>,
    level: Level,
    count: u32,
    rng: &mut G,
) -> Result<u32, SessionError>
where
    R: BufRead,
    W: Write,
    G: Rng + ?Sized,
{
    let mut score = 0;
    for _ in 0..count {
        let task = Task::random(level, rng);
        console.say(task)?;

        let answer = console.ask_until("> ", integer)?;
        debug!("{} = {}, answered {}", task, task.answer(), answer);
        if answer == task.answer() {
            console.say("Right!")?;
            score += 1;
        } else {
            console.say("Wrong")?;
        }
    }
    Ok(score)
}

/// The whole quiz. Returns the record when the student chose to save it.
pub fn run<R, W, G>(
    console: &mut Console<R, W>,
    results: &Path,
    rng: &mut G,
) -> Result<Option<QuizRecord>, SessionError>
where
    R: BufRead,
    W: Write,
    G: Rng + ?Sized,
{
    console.say(format!(
        "Which level do you want? Enter a number:\n1 - {}\n2 - {}",
        Level::Simple.description(),
        Level::Hard.description()
    ))?;
    let level = console.ask_until("> ", Level::from_answer)?;
    let score = take_test(console, level, TASKS, rng)?;

    console.say(format!(
        "Your mark is {}. Would you like to save the result? Enter yes or no.",
        score
    ))?;
    let save = console.ask("> ")?;

    let mut record = None;
    if save.trim().eq_ignore_ascii_case("yes") {
        console.say("What is your name?")?;
        let name = console.ask("> ")?;
        let saved = QuizRecord {
            name,
            score,
            tasks: TASKS,
            level,
        };
        fs::write(results, saved.to_string())?;
        console.say(format!(
            "The results are saved in \"{}\".",
            results
                .file_name()
                .map(|name| name.to_string_lossy())
                .unwrap_or_else(|| results.to_string_lossy())
        ))?;
        record = Some(saved);
    }

    console.say("See you!")?;
    Ok(record)
}
