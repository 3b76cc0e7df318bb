//! `resume-roaster` コマンド
//!
//! ```text
//! resume-roaster roast resume.pdf --tone savage
//! resume-roaster prompt --tone gentle --file-url blob://abc
//! resume-roaster schema
//! resume-roaster tones
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::error;

use resume_roaster::config::Settings;
use resume_roaster::engine::RoastWorkflow;
use resume_roaster::roast::{AnalysisRequest, AnalysisResult, ToneSetting, response_schema};
use resume_roaster::telemetry::init_logging;
use resume_roaster::transport::{FileReference, UploadedFile, create_transports};

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Debug, Parser)]
#[command(name = "resume-roaster", version, about = "AI による履歴書の辛口講評")]
struct Cli {
    /// 設定ファイル（TOML）
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// 詳細ログを出力する
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// 履歴書をアップロードして講評を受け取る
    Roast {
        /// 履歴書ファイル（PDF, PNG, JPG）
        file: PathBuf,

        /// 講評トーン（省略時は設定の既定値）
        #[arg(short, long)]
        tone: Option<ToneSetting>,

        /// 結果を JSON で出力する
        #[arg(long)]
        json: bool,
    },

    /// 送信される解析リクエストを表示する（送信はしない）
    Prompt {
        #[arg(short, long)]
        tone: Option<ToneSetting>,

        /// リクエストに埋め込むファイル参照
        #[arg(long, default_value = "blob://example")]
        file_url: String,
    },

    /// 応答 JSON Schema を表示する
    Schema,

    /// 選択できる講評トーンを一覧表示する
    Tones,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "コマンドが失敗しました");
            eprintln!("エラー: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> CliResult<()> {
    let settings = match &cli.config {
        Some(path) => Settings::from_file(path)?,
        None => Settings::default(),
    };

    let logging = settings.logging().clone().with_verbose(cli.verbose);
    let _guard = init_logging(&logging).map_err(|e| e.to_string())?;

    match cli.command {
        Command::Roast { file, tone, json } => roast(&settings, file, tone, json).await,
        Command::Prompt { tone, file_url } => {
            let tone = tone.unwrap_or(settings.default_tone());
            let request = AnalysisRequest::new(tone, &FileReference::new(file_url));
            println!("{}", request.to_json()?);
            Ok(())
        }
        Command::Schema => {
            println!("{}", serde_json::to_string_pretty(&response_schema())?);
            Ok(())
        }
        Command::Tones => {
            print_tones(settings.default_tone());
            Ok(())
        }
    }
}

async fn roast(
    settings: &Settings,
    path: PathBuf,
    tone: Option<ToneSetting>,
    json: bool,
) -> CliResult<()> {
    let transports = create_transports(settings)?;
    let mut workflow = RoastWorkflow::from_settings(settings);

    let file = UploadedFile::from_path(&path).await?;
    workflow.submit_file(file, transports.upload.as_ref()).await?;

    if let Some(tone) = tone {
        workflow.select_tone(tone)?;
    }

    let result = workflow.start_analysis(transports.analysis.as_ref()).await?;

    if json {
        println!("{}", result.to_json()?);
    } else {
        print_summary(result);
    }
    Ok(())
}

fn print_tones(default: ToneSetting) {
    for tone in ToneSetting::ALL {
        let marker = if tone == default { "*" } else { " " };
        println!("{} {:<7} {}", marker, tone.as_str(), tone.tagline());
    }
}

fn print_summary(result: &AnalysisResult) {
    println!(
        "Score: {}/100 ({})",
        result.overall_score,
        result.score_band().label()
    );
    println!("{}", result.roast_headline);
    println!();
    println!("{}", result.main_roast);

    for category in result.categories.views() {
        println!();
        println!("[{}] {}/10 - {}", category.label, category.score, category.roast);
        for finding in category.findings {
            println!("  - {}", finding);
        }
    }

    println!();
    println!("Improvement tips:");
    for (i, tip) in result.improvement_tips.iter().enumerate() {
        println!("  {}. {}", i + 1, tip);
    }

    println!();
    println!("Career suggestions:");
    for suggestion in &result.career_suggestions {
        println!("  - {}", suggestion);
    }

    println!();
    println!("Verdict: {}", result.final_verdict);
}
