//! Weighted signal scoring
//!
//! Turns an [`IndicatorSet`] into independent bullish and bearish scores, the
//! trend label they imply, and a separate bearish "immediate dip" score.
//! Missing indicators simply contribute nothing, so partial sets produced by
//! early termination are scored the same way as complete ones.

use serde::{Deserialize, Serialize};
use trend_config::service::signals::{DIP_SCORE_THRESHOLD, TREND_SCORE_THRESHOLD};
use types::{IndicatorSet, TrendLabel};

/// Trigger codes reported alongside a label
pub mod triggers {
    pub const MACD_BEARISH_CROSSOVER: &str = "MACD_BEARISH_CROSSOVER";
    pub const MACD_BULLISH_CROSSOVER: &str = "MACD_BULLISH_CROSSOVER";
    pub const EMA_BEARISH_CROSSOVER: &str = "EMA_BEARISH_CROSSOVER";
    pub const EMA_BULLISH_CROSSOVER: &str = "EMA_BULLISH_CROSSOVER";
    pub const RSI_OVERSOLD: &str = "RSI_OVERSOLD";
    pub const RSI_MOMENTUM_BREAKDOWN: &str = "RSI_MOMENTUM_BREAKDOWN";
    pub const RSI_WEAKENING: &str = "RSI_WEAKENING";
    pub const RSI_OVERBOUGHT: &str = "RSI_OVERBOUGHT";
    pub const RSI_MOMENTUM_BUILDUP: &str = "RSI_MOMENTUM_BUILDUP";
    pub const RSI_STRENGTHENING: &str = "RSI_STRENGTHENING";
    pub const PRICE_TREND_REVERSAL: &str = "PRICE_TREND_REVERSAL";
    pub const PRICE_DECLINE: &str = "PRICE_DECLINE";
    pub const PRICE_RALLY: &str = "PRICE_RALLY";
    pub const MAJOR_TREND_BREAKDOWN: &str = "MAJOR_TREND_BREAKDOWN";
    pub const MAJOR_TREND_BREAKOUT: &str = "MAJOR_TREND_BREAKOUT";
    pub const STRONG_BEARISH_TREND: &str = "STRONG_BEARISH_TREND";
    pub const STRONG_BULLISH_TREND: &str = "STRONG_BULLISH_TREND";
    pub const ADX_TREND_STRENGTH: &str = "ADX_TREND_STRENGTH";
    pub const VOLUME_CONFIRMED_SELLOFF: &str = "VOLUME_CONFIRMED_SELLOFF";
    pub const VOLUME_CONFIRMED_RALLY: &str = "VOLUME_CONFIRMED_RALLY";

    // Immediate-dip path
    pub const SHARP_PRICE_DROP: &str = "SHARP_PRICE_DROP";
    pub const MACD_BEARISH_MOMENTUM: &str = "MACD_BEARISH_MOMENTUM";
    pub const VOLUME_SPIKE_SELLOFF: &str = "VOLUME_SPIKE_SELLOFF";
    pub const ADX_BEARISH_MOMENTUM: &str = "ADX_BEARISH_MOMENTUM";
    pub const BELOW_EMA200_WEAK_RSI: &str = "BELOW_EMA200_WEAK_RSI";
}

use triggers::*;

/// MACD magnitude beyond which the crossover counts as strong
const MACD_STRENGTH_FLOOR: f64 = 0.1;
/// ADX above this marks a trending market
const ADX_TRENDING: f64 = 25.0;
/// Price change (percent) a volume spike must accompany
const VOLUME_CONFIRM_PCT: f64 = 2.0;
/// Smallest drop (percent) the dip path counts as a drop at all
const DIP_MIN_DROP_PCT: f64 = 2.0;
/// EMA200 gap (percent) for the stronger base weight
const EMA200_WIDE_GAP_PCT: f64 = 2.0;
/// Largest bonus the EMA200 gap can add
const EMA200_GAP_BONUS_CAP: f64 = 1.0;

/// Score thresholds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvaluatorConfig {
    pub trend_threshold: f64,
    pub dip_threshold: f64,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            trend_threshold: TREND_SCORE_THRESHOLD,
            dip_threshold: DIP_SCORE_THRESHOLD,
        }
    }
}

/// Accumulated weight for one direction and the conditions that produced it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tally {
    pub score: f64,
    pub triggers: Vec<String>,
}

impl Tally {
    fn add(&mut self, weight: f64, trigger: &str) {
        self.score += weight;
        if !self.triggers.iter().any(|t| t == trigger) {
            self.triggers.push(trigger.to_string());
        }
    }

    fn reaches(&self, threshold: f64) -> bool {
        self.score >= threshold
    }
}

/// Bullish and bearish scores for one indicator set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    pub bullish: Tally,
    pub bearish: Tally,
    threshold: f64,
}

impl Assessment {
    /// Bearish wins when both sides reach the threshold
    pub fn label(&self) -> TrendLabel {
        if self.bearish.reaches(self.threshold) {
            TrendLabel::Bearish
        } else if self.bullish.reaches(self.threshold) {
            TrendLabel::Bullish
        } else {
            TrendLabel::Neutral
        }
    }

    /// Triggers of the winning side; empty for a neutral label
    pub fn triggers(&self) -> Vec<String> {
        match self.label() {
            TrendLabel::Bearish => self.bearish.triggers.clone(),
            TrendLabel::Bullish => self.bullish.triggers.clone(),
            TrendLabel::Neutral => Vec::new(),
        }
    }
}

/// Bearish score of the immediate-dip path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DipAssessment {
    pub tally: Tally,
    threshold: f64,
}

impl DipAssessment {
    pub fn score(&self) -> f64 {
        self.tally.score
    }

    pub fn triggers(&self) -> &[String] {
        &self.tally.triggers
    }

    pub fn fires(&self) -> bool {
        self.tally.reaches(self.threshold)
    }
}

/// Stateless scorer; safe to share between tasks
#[derive(Debug, Clone, Copy, Default)]
pub struct Evaluator {
    config: EvaluatorConfig,
}

impl Evaluator {
    pub fn new(config: EvaluatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> EvaluatorConfig {
        self.config
    }

    /// Score both directions
    pub fn score(&self, set: &IndicatorSet) -> Assessment {
        Assessment {
            bullish: score_bullish(set),
            bearish: score_bearish(set),
            threshold: self.config.trend_threshold,
        }
    }

    /// Score the immediate-dip path
    pub fn dip_score(&self, set: &IndicatorSet) -> DipAssessment {
        DipAssessment {
            tally: score_dip(set),
            threshold: self.config.dip_threshold,
        }
    }
}

/// Distance between `value` and `reference` as a percentage of `reference`
fn gap_pct(reference: f64, value: f64) -> f64 {
    if reference == 0.0 {
        return 0.0;
    }
    ((reference - value) / reference).abs() * 100.0
}

fn score_bearish(set: &IndicatorSet) -> Tally {
    let mut tally = Tally::default();

    if let (Some(macd), Some(signal)) = (set.macd, set.signal_line) {
        if macd < signal {
            let weight = if macd < -MACD_STRENGTH_FLOOR {
                2.0 + (macd - signal).abs() * 10.0
            } else {
                1.5
            };
            tally.add(weight, MACD_BEARISH_CROSSOVER);
        }
    }

    if let (Some(fast), Some(slow)) = (set.ema12, set.ema26) {
        if fast < slow {
            tally.add(2.0 + gap_pct(slow, fast) * 0.1, EMA_BEARISH_CROSSOVER);
        }
    }

    if let Some(rsi) = set.rsi {
        if rsi < 30.0 {
            tally.add(2.0, RSI_OVERSOLD);
        } else if rsi < 40.0 {
            tally.add(1.5, RSI_MOMENTUM_BREAKDOWN);
        } else if rsi < 45.0 {
            tally.add(0.5, RSI_WEAKENING);
        }
    }

    if let Some(pct) = set.price_change_pct {
        if pct < -5.0 {
            tally.add(2.0, PRICE_TREND_REVERSAL);
        } else if pct < -3.0 {
            tally.add(1.5, PRICE_DECLINE);
        } else if pct < -1.0 {
            tally.add(0.5, PRICE_DECLINE);
        }
    }

    if let (Some(price), Some(ema200)) = (set.current_price, set.ema200) {
        if price < ema200 {
            let gap = gap_pct(ema200, price);
            let base = if gap > EMA200_WIDE_GAP_PCT { 1.5 } else { 1.0 };
            let mut weight = base + (gap * 0.1).min(EMA200_GAP_BONUS_CAP);
            if set.rsi.is_some_and(|rsi| rsi < 40.0) {
                weight += 0.5;
            }
            tally.add(weight, MAJOR_TREND_BREAKDOWN);
        }
    }

    if set.adx.is_some_and(|adx| adx > ADX_TRENDING) {
        if set.macd_bearish() == Some(true) {
            tally.add(1.5, STRONG_BEARISH_TREND);
        } else {
            tally.add(0.5, ADX_TREND_STRENGTH);
        }
    }

    if set.volume_spike == Some(true)
        && set.price_change_pct.is_some_and(|pct| pct < -VOLUME_CONFIRM_PCT)
    {
        tally.add(0.5, VOLUME_CONFIRMED_SELLOFF);
    }

    tally
}

fn score_bullish(set: &IndicatorSet) -> Tally {
    let mut tally = Tally::default();

    if let (Some(macd), Some(signal)) = (set.macd, set.signal_line) {
        if macd > signal {
            let weight = if macd > MACD_STRENGTH_FLOOR {
                2.0 + (macd - signal).abs() * 10.0
            } else {
                1.5
            };
            tally.add(weight, MACD_BULLISH_CROSSOVER);
        }
    }

    if let (Some(fast), Some(slow)) = (set.ema12, set.ema26) {
        if fast > slow {
            tally.add(2.0 + gap_pct(slow, fast) * 0.1, EMA_BULLISH_CROSSOVER);
        }
    }

    if let Some(rsi) = set.rsi {
        if rsi > 70.0 {
            tally.add(2.0, RSI_OVERBOUGHT);
        } else if rsi > 60.0 {
            tally.add(1.5, RSI_MOMENTUM_BUILDUP);
        } else if rsi > 55.0 {
            tally.add(0.5, RSI_STRENGTHENING);
        }
    }

    if let Some(pct) = set.price_change_pct {
        if pct > 5.0 {
            tally.add(2.0, PRICE_TREND_REVERSAL);
        } else if pct > 3.0 {
            tally.add(1.5, PRICE_RALLY);
        } else if pct > 1.0 {
            tally.add(0.5, PRICE_RALLY);
        }
    }

    if let (Some(price), Some(ema200)) = (set.current_price, set.ema200) {
        if price > ema200 {
            let gap = gap_pct(ema200, price);
            let base = if gap > EMA200_WIDE_GAP_PCT { 1.5 } else { 1.0 };
            let mut weight = base + (gap * 0.1).min(EMA200_GAP_BONUS_CAP);
            if set.rsi.is_some_and(|rsi| rsi > 60.0) {
                weight += 0.5;
            }
            tally.add(weight, MAJOR_TREND_BREAKOUT);
        }
    }

    if set.adx.is_some_and(|adx| adx > ADX_TRENDING) {
        if set.macd_bullish() == Some(true) {
            tally.add(1.5, STRONG_BULLISH_TREND);
        } else {
            tally.add(0.5, ADX_TREND_STRENGTH);
        }
    }

    if set.volume_spike == Some(true)
        && set.price_change_pct.is_some_and(|pct| pct > VOLUME_CONFIRM_PCT)
    {
        tally.add(0.5, VOLUME_CONFIRMED_RALLY);
    }

    tally
}

fn score_dip(set: &IndicatorSet) -> Tally {
    let mut tally = Tally::default();

    let drop = set.price_change_pct.map(|pct| -pct).filter(|drop| *drop > DIP_MIN_DROP_PCT);

    if let Some(drop) = drop {
        let weight = if drop > 7.0 {
            3.0
        } else if drop > 5.0 {
            2.0
        } else {
            1.0
        };
        tally.add(weight, SHARP_PRICE_DROP);
    }

    if let Some(rsi) = set.rsi {
        if rsi < 25.0 {
            tally.add(2.5, RSI_OVERSOLD);
        } else if rsi < 35.0 {
            tally.add(1.5, RSI_OVERSOLD);
        }
    }

    if let (Some(macd), Some(signal)) = (set.macd, set.signal_line) {
        if macd < signal && macd < 0.0 {
            tally.add(1.5 + ((signal - macd) * 10.0).min(1.0), MACD_BEARISH_MOMENTUM);
        }
    }

    if let (Some(fast), Some(slow)) = (set.ema12, set.ema26) {
        if fast < slow {
            tally.add(2.0 + (gap_pct(slow, fast) * 0.2).min(1.0), EMA_BEARISH_CROSSOVER);
        }
    }

    if set.volume_spike == Some(true) && drop.is_some() {
        tally.add(1.0, VOLUME_SPIKE_SELLOFF);
    }

    if set.adx.is_some_and(|adx| adx > ADX_TRENDING) && set.macd_bearish() == Some(true) {
        tally.add(1.5, ADX_BEARISH_MOMENTUM);
    }

    if let (Some(price), Some(ema200), Some(rsi)) = (set.current_price, set.ema200, set.rsi) {
        if price < ema200 && rsi < 40.0 {
            tally.add(1.0 + (gap_pct(ema200, price) * 0.1).min(0.5), BELOW_EMA200_WEAK_RSI);
        }
    }

    tally
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bearish_set() -> IndicatorSet {
        IndicatorSet {
            macd: Some(-1.2),
            signal_line: Some(-0.8),
            ema12: Some(95.0),
            ema26: Some(97.0),
            rsi: Some(28.0),
            ..IndicatorSet::at_price(94.0)
        }
    }

    fn bullish_set() -> IndicatorSet {
        IndicatorSet {
            macd: Some(1.2),
            signal_line: Some(0.8),
            ema12: Some(105.0),
            ema26: Some(103.0),
            rsi: Some(72.0),
            ..IndicatorSet::at_price(106.0)
        }
    }

    #[test]
    fn test_bearish_quartet_labels_bearish() {
        let assessment = Evaluator::default().score(&bearish_set());

        // 2.0 + 0.4 * 10 = 6.0 from MACD alone
        assert!(assessment.bearish.score >= 7.0);
        assert_eq!(assessment.bullish.score, 0.0);
        assert_eq!(assessment.label(), TrendLabel::Bearish);

        let triggers = assessment.triggers();
        assert!(triggers.contains(&MACD_BEARISH_CROSSOVER.to_string()));
        assert!(triggers.contains(&EMA_BEARISH_CROSSOVER.to_string()));
        assert!(triggers.contains(&RSI_OVERSOLD.to_string()));
    }

    #[test]
    fn test_bullish_quartet_labels_bullish() {
        let assessment = Evaluator::default().score(&bullish_set());
        assert_eq!(assessment.label(), TrendLabel::Bullish);
        assert!(assessment.triggers().contains(&RSI_OVERBOUGHT.to_string()));
    }

    #[test]
    fn test_empty_set_is_neutral() {
        let assessment = Evaluator::default().score(&IndicatorSet::insufficient());
        assert_eq!(assessment.label(), TrendLabel::Neutral);
        assert!(assessment.triggers().is_empty());
        assert!(!Evaluator::default().dip_score(&IndicatorSet::insufficient()).fires());
    }

    #[test]
    fn test_bearish_wins_tie() {
        let evaluator = Evaluator::new(EvaluatorConfig {
            trend_threshold: 0.5,
            dip_threshold: 6.0,
        });
        let set = IndicatorSet {
            // bearish MACD, bullish RSI
            macd: Some(-0.05),
            signal_line: Some(0.0),
            rsi: Some(72.0),
            ..IndicatorSet::default()
        };
        let assessment = evaluator.score(&set);
        assert!(assessment.bullish.score >= 0.5);
        assert!(assessment.bearish.score >= 0.5);
        assert_eq!(assessment.label(), TrendLabel::Bearish);
    }

    #[test]
    fn test_weak_macd_crossover_weight() {
        let set = IndicatorSet {
            macd: Some(-0.05),
            signal_line: Some(0.0),
            ..IndicatorSet::default()
        };
        let assessment = Evaluator::default().score(&set);
        assert_eq!(assessment.bearish.score, 1.5);
    }

    #[test]
    fn test_rsi_tiers() {
        let evaluator = Evaluator::default();
        let score = |rsi: f64| {
            evaluator
                .score(&IndicatorSet {
                    rsi: Some(rsi),
                    ..IndicatorSet::default()
                })
                .bearish
                .score
        };
        assert_eq!(score(29.0), 2.0);
        assert_eq!(score(39.0), 1.5);
        assert_eq!(score(44.0), 0.5);
        assert_eq!(score(50.0), 0.0);
    }

    #[test]
    fn test_adx_weight_depends_on_macd_direction() {
        let evaluator = Evaluator::default();
        let mut set = IndicatorSet {
            adx: Some(30.0),
            macd: Some(-0.05),
            signal_line: Some(0.0),
            ..IndicatorSet::default()
        };
        let confirmed = evaluator.score(&set);
        assert_eq!(confirmed.bearish.score, 1.5 + 1.5);
        assert!(confirmed.bearish.triggers.contains(&STRONG_BEARISH_TREND.to_string()));

        set.adx = Some(20.0);
        assert_eq!(evaluator.score(&set).bearish.score, 1.5);
    }

    #[test]
    fn test_volume_confirms_selloff() {
        let set = IndicatorSet {
            price_change_pct: Some(-2.5),
            volume_spike: Some(true),
            ..IndicatorSet::default()
        };
        let bearish = Evaluator::default().score(&set).bearish;
        assert_eq!(bearish.score, 0.5 + 0.5);
        assert!(bearish.triggers.contains(&VOLUME_CONFIRMED_SELLOFF.to_string()));
    }

    #[test]
    fn test_major_trend_breakdown_with_weak_rsi() {
        let set = IndicatorSet {
            ema200: Some(100.0),
            rsi: Some(50.0),
            ..IndicatorSet::at_price(99.0)
        };
        // 1% below: base 1.0 + 0.1 gap bonus
        let score = Evaluator::default().score(&set).bearish.score;
        assert!((score - 1.1).abs() < 1e-9);

        let set = IndicatorSet {
            rsi: Some(35.0),
            ..set
        };
        // + 1.5 RSI tier + 0.5 weak RSI bonus
        let score = Evaluator::default().score(&set).bearish.score;
        assert!((score - 3.1).abs() < 1e-9);
    }

    #[test]
    fn test_dip_fires_on_sharp_drop() {
        let set = IndicatorSet {
            price_change_pct: Some(-8.0),
            rsi: Some(22.0),
            volume_spike: Some(true),
            ..IndicatorSet::default()
        };
        let dip = Evaluator::default().dip_score(&set);
        // 3.0 + 2.5 + 1.0
        assert!((dip.score() - 6.5).abs() < 1e-9);
        assert!(dip.fires());
        assert!(dip.triggers().contains(&SHARP_PRICE_DROP.to_string()));
        assert!(dip.triggers().contains(&VOLUME_SPIKE_SELLOFF.to_string()));
    }

    #[test]
    fn test_dip_below_threshold() {
        let set = IndicatorSet {
            price_change_pct: Some(-3.0),
            rsi: Some(33.0),
            ..IndicatorSet::default()
        };
        let dip = Evaluator::default().dip_score(&set);
        assert_eq!(dip.score(), 2.5);
        assert!(!dip.fires());
    }

    #[test]
    fn test_dip_ignores_small_moves() {
        let small = IndicatorSet {
            price_change_pct: Some(-1.5),
            volume_spike: Some(true),
            ..IndicatorSet::default()
        };
        let dip = Evaluator::default().dip_score(&small);
        assert_eq!(dip.score(), 0.0);
        assert!(dip.triggers().is_empty());

        let modest = IndicatorSet {
            price_change_pct: Some(-2.5),
            volume_spike: Some(true),
            ..IndicatorSet::default()
        };
        let dip = Evaluator::default().dip_score(&modest);
        // 1.0 drop + 1.0 spike
        assert_eq!(dip.score(), 2.0);
        assert_eq!(dip.triggers(), [SHARP_PRICE_DROP, VOLUME_SPIKE_SELLOFF]);
    }
}
