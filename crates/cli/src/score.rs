//! `smatch score`: evaluate one buyer preference against one stock item.

use clap::Args;
use serde::Serialize;

use stockmatch_matcher::config::FinishVocabulary;
use stockmatch_matcher::engine::PairReport;
use stockmatch_matcher::scorer::MAX_SCORE;
use stockmatch_matcher::vocabulary::translate_finish;
use stockmatch_matcher::{explain_pair, BuyerPreference, SupplierItem};

use crate::exit_codes::EXIT_ERROR;
use crate::CliError;

#[derive(Args, Debug)]
pub struct ScoreArgs {
    /// Buyer's preferred grade
    #[arg(long)]
    pub grade: String,

    /// Buyer's preferred finish (German terms are translated when --translated is set)
    #[arg(long)]
    pub finish: Option<String>,

    /// Buyer's preferred thickness in mm
    #[arg(long)]
    pub thickness: Option<f64>,

    /// Buyer's preferred width in mm
    #[arg(long)]
    pub width: Option<f64>,

    /// Buyer's weight ceiling in kg
    #[arg(long)]
    pub max_weight: Option<f64>,

    /// Buyer's quantity floor
    #[arg(long)]
    pub min_quantity: Option<i64>,

    /// Stock item grade
    #[arg(long)]
    pub item_grade: String,

    /// Stock item finish
    #[arg(long)]
    pub item_finish: Option<String>,

    /// Stock item thickness in mm (omit for items without dimensions)
    #[arg(long)]
    pub item_thickness: Option<f64>,

    /// Stock item width in mm
    #[arg(long)]
    pub item_width: Option<f64>,

    /// Stock item weight in kg
    #[arg(long)]
    pub item_weight: f64,

    /// Stock item quantity
    #[arg(long)]
    pub item_quantity: i64,

    /// Compare against the translated buyer finish
    #[arg(long)]
    pub translated: bool,

    /// Output JSON instead of text
    #[arg(long)]
    pub json: bool,
}

impl ScoreArgs {
    fn buyer(&self) -> BuyerPreference {
        BuyerPreference {
            buyer_id: "cli".into(),
            preferred_grade: self.grade.clone(),
            preferred_finish: self.finish.clone(),
            preferred_finish_translated: self.finish.as_deref().map(|f| translate_finish(f).to_string()),
            preferred_thickness_mm: self.thickness,
            preferred_width_mm: self.width,
            max_weight_kg: self.max_weight,
            min_quantity: self.min_quantity,
        }
    }

    fn item(&self) -> SupplierItem {
        SupplierItem {
            ordinal: 0,
            source: "cli".into(),
            quality: String::new(),
            grade: self.item_grade.clone(),
            finish: self.item_finish.clone(),
            thickness_mm: self.item_thickness,
            width_mm: self.item_width,
            description: String::new(),
            weight_kg: self.item_weight,
            quantity: self.item_quantity,
        }
    }

    fn vocabulary(&self) -> FinishVocabulary {
        if self.translated {
            FinishVocabulary::Translated
        } else {
            FinishVocabulary::Original
        }
    }
}

#[derive(Serialize)]
struct ScoreOutput<'a> {
    eligible: bool,
    match_score: u32,
    max_score: u32,
    match_reason: String,
    #[serde(flatten)]
    report: &'a PairReport,
}

pub fn cmd_score(args: ScoreArgs) -> Result<(), CliError> {
    let report = explain_pair(&args.buyer(), &args.item(), args.vocabulary());
    let eval = &report.evaluation;

    if args.json {
        let out = ScoreOutput {
            eligible: report.is_eligible(),
            match_score: eval.score(),
            max_score: MAX_SCORE,
            match_reason: eval.reason(),
            report: &report,
        };
        let json = serde_json::to_string_pretty(&out)
            .map_err(|e| CliError { code: EXIT_ERROR, message: format!("JSON serialization error: {e}"), hint: None })?;
        println!("{json}");
        return Ok(());
    }

    match report.rejection {
        None => println!("eligible:  yes"),
        Some(r) => println!("eligible:  no ({r} check failed)"),
    }
    let b = &eval.breakdown;
    println!(
        "score:     {}/{MAX_SCORE} (grade {}, finish {}, thickness {}, width {})",
        eval.score(),
        b.grade,
        b.finish,
        b.thickness,
        b.width,
    );
    println!("reason:    {}", eval.reason());
    Ok(())
}
