use serde::{Deserialize, Serialize};

/// XP per correct answer
pub const XP_PER_CORRECT: i64 = 10;
/// Accuracy bonus at 100% accuracy
pub const MAX_ACCURACY_BONUS: i64 = 50;
/// Par time per question for the quick play speed bonus
pub const PAR_SECONDS_PER_QUESTION: i64 = 15;
/// Survival bonus per round played
pub const SURVIVAL_ROUND_BONUS: i64 = 5;

/// Upper bound applied to question counts coming from clients
const MAX_QUESTIONS: i64 = 10_000;
/// Upper bound applied to reported durations (one day)
const MAX_TIME_SECS: i64 = 86_400;

/// Quiz game mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuizMode {
    Classic,
    QuickPlay,
    FocusDrill,
    TimeAttack,
    Survival,
}

impl QuizMode {
    /// Convert from database string
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "classic" => Ok(QuizMode::Classic),
            "quick_play" => Ok(QuizMode::QuickPlay),
            "focus_drill" => Ok(QuizMode::FocusDrill),
            "time_attack" => Ok(QuizMode::TimeAttack),
            "survival" => Ok(QuizMode::Survival),
            _ => Err(format!("Invalid quiz mode: {}", s)),
        }
    }

    /// Convert to database string
    pub fn as_str(&self) -> &'static str {
        match self {
            QuizMode::Classic => "classic",
            QuizMode::QuickPlay => "quick_play",
            QuizMode::FocusDrill => "focus_drill",
            QuizMode::TimeAttack => "time_attack",
            QuizMode::Survival => "survival",
        }
    }

    /// XP earned for a single play before diminishing returns
    pub fn raw_xp(&self, performance: &QuizPerformance) -> i64 {
        let p = performance.clamped();
        let base = base_xp(p.correct);
        let accuracy = accuracy_bonus(p.correct, p.total);

        match self {
            QuizMode::Classic => base + accuracy,
            QuizMode::QuickPlay => {
                base + accuracy + speed_bonus(p.correct, p.total, p.time_taken_secs)
            }
            QuizMode::FocusDrill => (base + accuracy) * p.difficulty.quarters() / 4,
            QuizMode::TimeAttack => (base + accuracy) * combo_quarters(p.streak) / 4,
            QuizMode::Survival => base + accuracy + p.total * SURVIVAL_ROUND_BONUS,
        }
    }

    /// Full XP breakdown for a play, including the diminishing returns
    /// multiplier for the `play_index`-th play of the day (1-based).
    pub fn breakdown(&self, performance: &QuizPerformance, play_index: i64) -> XpBreakdown {
        let p = performance.clamped();
        let base = base_xp(p.correct);
        let accuracy = accuracy_bonus(p.correct, p.total);
        let raw = self.raw_xp(&p);
        let awarded = raw * diminishing_quarters(play_index) / 4;

        XpBreakdown {
            mode: *self,
            base_xp: base,
            accuracy_bonus: accuracy,
            mode_bonus: raw - base - accuracy,
            raw_xp: raw,
            play_index: play_index.max(1),
            diminishing_multiplier: diminishing_multiplier(play_index),
            awarded_xp: awarded,
        }
    }
}

/// Question difficulty, only consulted by focus drills
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            _ => Err(format!("Invalid difficulty: {}", s)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    /// Focus drill multiplier in quarters (1x, 1.5x, 2x)
    fn quarters(&self) -> i64 {
        match self {
            Difficulty::Easy => 4,
            Difficulty::Medium => 6,
            Difficulty::Hard => 8,
        }
    }
}

/// Raw numbers reported for one quiz play
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct QuizPerformance {
    pub correct: i64,
    pub total: i64,
    pub time_taken_secs: i64,
    /// Longest run of consecutive correct answers
    pub streak: i64,
    pub difficulty: Difficulty,
}

impl QuizPerformance {
    /// Clamp client supplied values into a sane range.
    ///
    /// Negative values become zero and `correct` never exceeds `total`.
    pub fn clamped(&self) -> Self {
        let total = self.total.clamp(0, MAX_QUESTIONS);
        Self {
            correct: self.correct.clamp(0, total),
            total,
            time_taken_secs: self.time_taken_secs.clamp(0, MAX_TIME_SECS),
            streak: self.streak.clamp(0, MAX_QUESTIONS),
            difficulty: self.difficulty,
        }
    }
}

/// How the XP for a play was put together
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct XpBreakdown {
    pub mode: QuizMode,
    pub base_xp: i64,
    pub accuracy_bonus: i64,
    /// Speed/survival bonus or the extra from a difficulty/combo multiplier
    pub mode_bonus: i64,
    pub raw_xp: i64,
    pub play_index: i64,
    pub diminishing_multiplier: f64,
    pub awarded_xp: i64,
}

/// Base XP: 10 per correct answer
pub fn base_xp(correct: i64) -> i64 {
    correct.clamp(0, MAX_QUESTIONS) * XP_PER_CORRECT
}

/// floor(accuracy * 50), zero when no questions were asked
pub fn accuracy_bonus(correct: i64, total: i64) -> i64 {
    let total = total.clamp(0, MAX_QUESTIONS);
    if total == 0 {
        return 0;
    }
    let correct = correct.clamp(0, total);
    correct * MAX_ACCURACY_BONUS / total
}

/// One XP per second under par, capped at 30% of base XP
pub fn speed_bonus(correct: i64, total: i64, time_taken_secs: i64) -> i64 {
    let total = total.clamp(0, MAX_QUESTIONS);
    let correct = correct.clamp(0, total);
    let par = total * PAR_SECONDS_PER_QUESTION;
    let saved = (par - time_taken_secs.clamp(0, MAX_TIME_SECS)).max(0);
    let cap = base_xp(correct) * 3 / 10;
    saved.min(cap)
}

/// Time attack combo multiplier by streak length
pub fn combo_multiplier(streak: i64) -> f64 {
    combo_quarters(streak) as f64 / 4.0
}

fn combo_quarters(streak: i64) -> i64 {
    match streak.max(0) {
        0..=2 => 4,
        3..=5 => 6,
        6..=9 => 8,
        _ => 10,
    }
}

/// Anti-farming multiplier for the n-th play of the day (1-based)
pub fn diminishing_multiplier(play_count: i64) -> f64 {
    diminishing_quarters(play_count) as f64 / 4.0
}

fn diminishing_quarters(play_count: i64) -> i64 {
    match play_count {
        i64::MIN..=3 => 4,
        4..=6 => 3,
        7..=10 => 2,
        _ => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn perf(correct: i64, total: i64) -> QuizPerformance {
        QuizPerformance {
            correct,
            total,
            ..Default::default()
        }
    }

    #[test]
    fn test_classic_xp() {
        // 8/10: base 80, accuracy floor(0.8 * 50) = 40
        assert_eq!(QuizMode::Classic.raw_xp(&perf(8, 10)), 120);
        // 1/3: accuracy floor(16.66) = 16
        assert_eq!(QuizMode::Classic.raw_xp(&perf(1, 3)), 26);
    }

    #[test]
    fn test_quick_play_speed_bonus_is_capped() {
        let fast = QuizPerformance {
            correct: 10,
            total: 10,
            time_taken_secs: 10,
            ..Default::default()
        };
        // par 150s, saved 140s, capped at 30% of 100
        assert_eq!(speed_bonus(10, 10, 10), 30);
        assert_eq!(QuizMode::QuickPlay.raw_xp(&fast), 100 + 50 + 30);

        let slow = QuizPerformance {
            time_taken_secs: 145,
            ..fast
        };
        assert_eq!(QuizMode::QuickPlay.raw_xp(&slow), 100 + 50 + 5);

        let over_par = QuizPerformance {
            time_taken_secs: 600,
            ..fast
        };
        assert_eq!(QuizMode::QuickPlay.raw_xp(&over_par), 150);
    }

    #[test]
    fn test_focus_drill_difficulty() {
        let mut p = perf(5, 10);
        p.difficulty = Difficulty::Easy;
        assert_eq!(QuizMode::FocusDrill.raw_xp(&p), 75);
        p.difficulty = Difficulty::Medium;
        assert_eq!(QuizMode::FocusDrill.raw_xp(&p), 112);
        p.difficulty = Difficulty::Hard;
        assert_eq!(QuizMode::FocusDrill.raw_xp(&p), 150);
    }

    #[test]
    fn test_time_attack_combo() {
        let mut p = perf(10, 10);
        p.streak = 10;
        assert_eq!(QuizMode::TimeAttack.raw_xp(&p), 375);
        p.streak = 4;
        assert_eq!(QuizMode::TimeAttack.raw_xp(&p), 225);
    }

    #[test]
    fn test_survival_pays_per_round() {
        assert_eq!(QuizMode::Survival.raw_xp(&perf(0, 4)), 20);
        assert_eq!(QuizMode::Survival.raw_xp(&perf(3, 4)), 30 + 37 + 20);
    }

    #[test]
    fn test_zero_correct_gives_zero_xp() {
        let modes = [
            QuizMode::Classic,
            QuizMode::QuickPlay,
            QuizMode::FocusDrill,
            QuizMode::TimeAttack,
        ];
        for mode in modes {
            for total in [0, 1, 10, 50] {
                let p = QuizPerformance {
                    correct: 0,
                    total,
                    time_taken_secs: 1,
                    streak: 12,
                    difficulty: Difficulty::Hard,
                };
                assert_eq!(mode.raw_xp(&p), 0, "{:?} with total {}", mode, total);
            }
        }
    }

    #[test]
    fn test_inputs_are_clamped() {
        // correct > total is treated as a perfect score
        assert_eq!(QuizMode::Classic.raw_xp(&perf(15, 10)), 150);
        assert_eq!(QuizMode::Classic.raw_xp(&perf(-3, 10)), 0);
        assert_eq!(QuizMode::Classic.raw_xp(&perf(5, -10)), 0);
        assert_eq!(speed_bonus(5, 5, -100), 15);
    }

    #[test]
    fn test_combo_multiplier_steps() {
        assert_eq!(combo_multiplier(0), 1.0);
        assert_eq!(combo_multiplier(2), 1.0);
        assert_eq!(combo_multiplier(3), 1.5);
        assert_eq!(combo_multiplier(5), 1.5);
        assert_eq!(combo_multiplier(6), 2.0);
        assert_eq!(combo_multiplier(9), 2.0);
        assert_eq!(combo_multiplier(10), 2.5);
        assert_eq!(combo_multiplier(250), 2.5);
        assert_eq!(combo_multiplier(-4), 1.0);
    }

    #[test]
    fn test_diminishing_multiplier_steps() {
        assert_eq!(diminishing_multiplier(1), 1.0);
        assert_eq!(diminishing_multiplier(3), 1.0);
        assert_eq!(diminishing_multiplier(4), 0.75);
        assert_eq!(diminishing_multiplier(6), 0.75);
        assert_eq!(diminishing_multiplier(7), 0.5);
        assert_eq!(diminishing_multiplier(10), 0.5);
        assert_eq!(diminishing_multiplier(11), 0.25);
        assert_eq!(diminishing_multiplier(0), 1.0);
    }

    #[test]
    fn test_breakdown_applies_diminishing_returns() {
        let p = perf(8, 10);
        let first = QuizMode::Classic.breakdown(&p, 1);
        assert_eq!(first.raw_xp, 120);
        assert_eq!(first.awarded_xp, 120);

        let fifth = QuizMode::Classic.breakdown(&p, 5);
        assert_eq!(fifth.awarded_xp, 90);
        assert_eq!(fifth.diminishing_multiplier, 0.75);

        let twelfth = QuizMode::Classic.breakdown(&p, 12);
        assert_eq!(twelfth.awarded_xp, 30);
    }

    #[test]
    fn test_breakdown_parts_sum_to_raw() {
        let p = QuizPerformance {
            correct: 7,
            total: 9,
            time_taken_secs: 60,
            streak: 7,
            difficulty: Difficulty::Medium,
        };
        for mode in [
            QuizMode::Classic,
            QuizMode::QuickPlay,
            QuizMode::FocusDrill,
            QuizMode::TimeAttack,
            QuizMode::Survival,
        ] {
            let b = mode.breakdown(&p, 1);
            assert_eq!(b.base_xp + b.accuracy_bonus + b.mode_bonus, b.raw_xp);
        }
    }

    #[test]
    fn test_mode_string_roundtrip() {
        assert_eq!(QuizMode::from_str("time_attack").unwrap(), QuizMode::TimeAttack);
        assert_eq!(QuizMode::QuickPlay.as_str(), "quick_play");
        assert!(QuizMode::from_str("blitz").is_err());
    }
}
