//! Match score parsing and reporting helpers.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Games won by each player in one set, written `3-1` or `3:1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScorePair {
    /// Score of the first player.
    pub player1: u32,
    /// Score of the second player.
    pub player2: u32,
}

impl ScorePair {
    /// Creates a score pair.
    pub fn new(player1: u32, player2: u32) -> Self {
        Self { player1, player2 }
    }
}

impl fmt::Display for ScorePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.player1, self.player2)
    }
}

/// A score token that is not of the form `a-b` or `a:b`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid score: {0}")]
pub struct ScoreError(pub String);

impl FromStr for ScorePair {
    type Err = ScoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ScoreError(s.to_string());
        let (player1, player2) = s.split_once(['-', ':']).ok_or_else(invalid)?;
        Ok(Self {
            player1: player1.trim().parse().map_err(|_| invalid())?,
            player2: player2.trim().parse().map_err(|_| invalid())?,
        })
    }
}

/// Parses every token as a score pair.
pub fn parse_scores<'a>(
    tokens: impl IntoIterator<Item = &'a str>,
) -> Result<Vec<ScorePair>, ScoreError> {
    tokens.into_iter().map(str::parse).collect()
}

/// Formats scores the way Challonge stores them: `3-1,2-3`.
pub fn scores_csv(scores: &[ScorePair]) -> String {
    scores
        .iter()
        .map(ScorePair::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

/// The side that won a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Winner {
    /// The first player won more sets.
    Player1,
    /// The second player won more sets.
    Player2,
    /// Both players won the same number of sets.
    Tie,
}

/// Decides the winner by number of sets won.
pub fn winner(scores: &[ScorePair]) -> Winner {
    let sets_player1 = scores.iter().filter(|s| s.player1 > s.player2).count();
    let sets_player2 = scores.iter().filter(|s| s.player1 < s.player2).count();
    match sets_player1.cmp(&sets_player2) {
        std::cmp::Ordering::Greater => Winner::Player1,
        std::cmp::Ordering::Less => Winner::Player2,
        std::cmp::Ordering::Equal => Winner::Tie,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("3-1", ScorePair::new(3, 1))]
    #[case("11:9", ScorePair::new(11, 9))]
    #[case("0-0", ScorePair::new(0, 0))]
    fn test_parse_score_pair(#[case] input: &str, #[case] expected: ScorePair) {
        assert_eq!(input.parse::<ScorePair>(), Ok(expected));
    }

    #[rstest]
    #[case("3")]
    #[case("a-b")]
    #[case("3-")]
    #[case("-1-2")]
    fn test_parse_invalid_score(#[case] input: &str) {
        assert_eq!(
            input.parse::<ScorePair>(),
            Err(ScoreError(input.to_string()))
        );
    }

    #[test]
    fn test_winner_by_sets() {
        let scores = parse_scores(["11-9", "5-11", "11-3"]).expect("valid scores");
        assert_eq!(winner(&scores), Winner::Player1);
        assert_eq!(scores_csv(&scores), "11-9,5-11,11-3");

        let scores = parse_scores(["1-3", "2:2"]).expect("valid scores");
        assert_eq!(winner(&scores), Winner::Player2);

        let scores = parse_scores(["3-1", "1-3"]).expect("valid scores");
        assert_eq!(winner(&scores), Winner::Tie);
    }
}
