use clap::Parser;
use stylecut::core::{intake, share, Storage};
use stylecut::domain::model::AnalysisResult;
use stylecut::utils::error::ErrorSeverity;
use stylecut::utils::{logger, validation::Validate};
use stylecut::{AppConfig, CliConfig, GeminiAdvisor, LocalStorage, SessionController, StyleCutError};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.json_logs {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting stylecut CLI");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    // 載入並驗證配置
    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Configuration validation failed: {}", e);
            tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(exit_code(e.severity()));
        }
    };

    match run(&cli, config).await {
        Ok(()) => {
            tracing::info!("✅ Done");
        }
        Err(e) => {
            // 記錄詳細錯誤信息
            tracing::error!(
                "❌ stylecut failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            // 輸出用戶友好的錯誤信息
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 建議: {}", e.recovery_suggestion());

            let code = exit_code(e.severity());
            if code > 0 {
                std::process::exit(code);
            }
        }
    }

    Ok(())
}

/// 根據錯誤嚴重程度決定退出碼
fn exit_code(severity: ErrorSeverity) -> i32 {
    match severity {
        ErrorSeverity::Low => 0,      // 警告，但成功
        ErrorSeverity::Medium => 2,   // 可重試
        ErrorSeverity::High => 1,     // 處理錯誤
        ErrorSeverity::Critical => 3, // 系統錯誤
    }
}

fn load_config(cli: &CliConfig) -> stylecut::Result<AppConfig> {
    cli.validate()?;
    let mut config = AppConfig::load(cli.config.as_deref())?;
    cli.apply_overrides(&mut config);
    config.validate()?;
    Ok(config)
}

async fn run(cli: &CliConfig, config: AppConfig) -> stylecut::Result<()> {
    let preferences = cli.preferences(config.defaults);
    let advisor = GeminiAdvisor::new(config)?;
    let controller = SessionController::from_gemini(advisor, preferences);

    // 讀取自拍照
    let input = LocalStorage::new(".".to_string());
    let photo = input.read_file(&cli.photo).await?;
    let declared_mime = intake::mime_from_path(&cli.photo);
    controller.select_photo(photo, declared_mime.as_deref()).await?;

    println!("🔍 Analyzing your face shape and features...");
    let Some(result) = controller.analyze().await? else {
        return Err(StyleCutError::analysis("analysis was superseded"));
    };
    print_analysis(&result);

    for description in &cli.custom {
        println!("✨ Creating custom style: {}", description.trim());
        match controller.customize(description).await? {
            Some(rec) => println!("   ➕ {} [{}]\n      {}", rec.name, rec.id, rec.why_it_suits),
            None => println!("   ⚠️  Could not create that style, skipping"),
        }
    }

    let Some(index) = cli.try_on else {
        return Ok(());
    };

    let snapshot = controller.snapshot().await;
    let recommendations = snapshot.recommendations();
    let Some(style) = recommendations.get(index) else {
        return Err(StyleCutError::InvalidConfigValueError {
            field: "try_on".to_string(),
            value: index.to_string(),
            reason: format!("only {} styles available", recommendations.len()),
        });
    };

    println!("🎨 Generating try-on for {}...", style.name);
    let Some(image) = controller.try_on(&style.id).await? else {
        return Err(StyleCutError::generation("try-on was superseded"));
    };

    let output = LocalStorage::new(cli.output_path.clone());
    let file_name = share::save_file_name(&style.id, &image);
    output.write_file(&file_name, &image.data).await?;

    println!("📁 Saved to: {}/{}", output.base_path(), file_name);
    println!("📍 Find a salon: {}", share::salon_search_url(&style.name));
    println!(
        "📤 Share \"{}\" as {}: {}",
        share::share_title(&style.name),
        share::share_file_name(&image),
        share::share_caption(&style.name)
    );
    Ok(())
}

fn print_analysis(result: &AnalysisResult) {
    let analysis = &result.analysis;
    println!(
        "\n🧑 Face shape: {} ({:.0}% confidence)",
        analysis.face_shape, analysis.confidence_score
    );
    println!("   {}", analysis.face_shape_description);
    println!(
        "   Jawline: {} | Forehead: {} | Cheekbones: {}",
        analysis.features.jawline, analysis.features.forehead, analysis.features.cheekbones
    );
    println!(
        "   Hair type: {} | Skin tone: {}",
        analysis.detected_hair_type, analysis.skin_tone
    );

    println!("\n💇 Recommended styles:");
    for (i, rec) in result.recommendations.iter().enumerate() {
        println!("  [{}] {} ({} maintenance)", i, rec.name, rec.maintenance_level);
        println!("      {}", rec.description);
        println!("      Why: {}", rec.why_it_suits);
        if !rec.styling_tips.is_empty() {
            println!("      Tips: {}", rec.styling_tips.join("; "));
        }
        if !rec.products.is_empty() {
            println!("      Products: {}", rec.products.join(", "));
        }
    }
    println!();
}
