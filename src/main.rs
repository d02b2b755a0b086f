use anyhow::Context;
use clap::Parser;
use dialoguer::{Confirm, Input};
use holo_manager::{cli, config, error, export, image_input, storage, view};
use holo_manager_common::measurement::columns;
use holo_manager_common::types::capture_params;
use holo_manager_common::{Category, EntryDraft, EntryRepository, ImageSlot, MeasurementTable};
use cli::{decision_index, find_entry, parse_page_action, Cli, Commands, PageAction};
use config::Config;
use error::HoloError;
use storage::FileStorage;
use tracing::{debug, warn, Level};
use tracing_subscriber::FmtSubscriber;

type Repository = EntryRepository<FileStorage>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::WARN })
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let mut config = Config::load().context("設定ファイルを読み込めません")?;

    if let Commands::Config { set_data_dir, set_export_dir, set_page_size, show } = &cli.command {
        let changed = set_data_dir.is_some() || set_export_dir.is_some() || set_page_size.is_some();
        if let Some(dir) = set_data_dir {
            config.data_dir = Some(dir.clone());
        }
        if let Some(dir) = set_export_dir {
            config.export_dir = Some(dir.clone());
        }
        if let Some(size) = set_page_size {
            config.set_page_size(*size)?;
        }
        if changed {
            config.save()?;
            println!("✔ 設定を保存しました: {}", Config::config_path()?.display());
        }

        if *show || !changed {
            println!("設定:");
            println!("  データ保存先: {}", config.data_file()?.display());
            println!("  エクスポート先: {}", config.resolve_export_dir().display());
            println!("  1ページの件数: {}", config.page_size);
        }
        return Ok(());
    }

    let data_file = config.data_file()?;
    let file_storage = FileStorage::open(&data_file)
        .with_context(|| format!("保存ファイルを開けません: {}", data_file.display()))?;
    let mut repo = EntryRepository::open(file_storage).with_page_size(config.page_size);
    let category = cli.category.unwrap_or_else(|| repo.active_category());
    debug!(category = %category, path = %data_file.display(), "開始");

    match cli.command {
        Commands::List { page, interactive } => {
            repo.set_page(category, page);
            print_page(&repo, category);
            if interactive {
                loop {
                    let input: String = Input::new()
                        .with_prompt("n:次 p:前 q:終了")
                        .allow_empty(true)
                        .interact_text()?;
                    let before = repo.current_page(category);
                    let after = match parse_page_action(&input) {
                        Some(PageAction::Next) => repo.next_page(category),
                        Some(PageAction::Prev) => repo.prev_page(category),
                        Some(PageAction::Quit) => break,
                        None => {
                            println!("n / p / q のいずれかを入力してください");
                            continue;
                        }
                    };
                    if after == before {
                        println!("これ以上ページはありません");
                        continue;
                    }
                    print_page(&repo, category);
                }
            }
        }

        Commands::Add {
            title,
            memo,
            shot_at,
            params,
            capture,
            mode,
            distances,
            decision,
            calc_shutter,
            image1,
            image2,
        } => {
            let mut draft = EntryDraft {
                title,
                memo,
                shot_at,
                ..Default::default()
            };
            for kv in params {
                draft.params.insert(kv.key, kv.value);
            }
            for kv in capture {
                draft.capture_params.insert(kv.key, kv.value);
            }

            match category {
                Category::Test => {
                    let mut table = MeasurementTable::build(mode.unwrap_or_default());
                    for item in &distances {
                        table.set_value(item.index(), columns::DISTANCE, &item.value)?;
                    }
                    if let Some(row) = decision {
                        table.set_decision(decision_index(row)?);
                    }
                    if calc_shutter {
                        table.compute_shutter_times(
                            draft.capture_number(capture_params::EXPOSURE_AREA),
                            draft.capture_number(capture_params::EXPOSURE_POWER),
                        );
                    }
                    draft.measurement = Some(table);
                }
                Category::Product => {
                    if mode.is_some() || !distances.is_empty() || decision.is_some() || calc_shutter {
                        warn!("作成ホログラムには計測データを保存しません");
                    }
                }
            }
            draft.apply_capture_placeholders();
            if category == Category::Test && !draft.params.is_empty() {
                warn!("露光テストにはホロパラメータを保存しません");
            }

            for (slot, path) in [(ImageSlot::First, image1), (ImageSlot::Second, image2)] {
                if let Some(path) = path {
                    let data_url = image_input::load_image_data_url(&path).await?;
                    if image_input::extension_mismatch(&path, &data_url) {
                        warn!(path = %path.display(), "拡張子と画像形式が一致しません");
                    }
                    draft.set_image(slot, data_url);
                }
            }

            let entry = repo.create_entry(category, draft);
            report_persist_error(&mut repo);
            println!("✔ {}に追加しました: {}", category.label(), entry.badge());
            println!("  ID: {}", entry.id);
        }

        Commands::Show { id } => {
            let entry = find_entry(&repo, category, &id)?;
            println!("{}", view::entry_detail(category, entry));
        }

        Commands::Memo { id, text } => {
            let entry_id = find_entry(&repo, category, &id)?.id.clone();
            repo.update_memo(category, &entry_id, &text);
            report_persist_error(&mut repo);
            println!("✔ メモを更新しました");
        }

        Commands::Delete { id, yes } => {
            let entry = find_entry(&repo, category, &id)?;
            let (entry_id, badge) = (entry.id.clone(), entry.badge());
            let confirmed = yes
                || Confirm::new()
                    .with_prompt(format!("{} を削除しますか？", badge))
                    .default(false)
                    .interact()?;
            if !confirmed {
                println!("削除を取り消しました");
                return Ok(());
            }
            repo.delete_entry(category, &entry_id);
            report_persist_error(&mut repo);
            println!("✔ 削除しました: {}", badge);
        }

        Commands::Latex { id, output } => {
            let entry = find_entry(&repo, category, &id)?;
            let latex = export::entry_latex(category, entry)?;
            match output {
                Some(output) => {
                    let path = export::write_latex(&latex, entry, &output)?;
                    println!("✔ LaTeX出力: {}", path.display());
                }
                None => println!("{}", latex),
            }
        }

        Commands::Photo { id, slot, output } => {
            let slot = ImageSlot::from_number(slot).ok_or_else(|| {
                HoloError::InvalidArgument(format!("写真の番号は1か2です: {}", slot))
            })?;
            let entry = find_entry(&repo, category, &id)?;
            let path = export::photo::write_photo(entry, slot, &output)?;
            println!("✔ 写真出力: {}", path.display());
        }

        Commands::Export { output } => {
            let output_dir = output.unwrap_or_else(|| config.resolve_export_dir());
            let document = repo.export_snapshot()?;
            let path = export::write_snapshot(&document, &output_dir)?;
            let snapshot = repo.snapshot();
            println!(
                "✔ エクスポート: {} (露光テスト {}件 / 作成ホログラム {}件)",
                path.display(),
                snapshot.test.len(),
                snapshot.product.len()
            );
        }

        Commands::Import { input, yes } => {
            let text = std::fs::read_to_string(&input)
                .with_context(|| format!("ファイルを読み込めません: {}", input.display()))?;
            let confirmed = yes
                || Confirm::new()
                    .with_prompt("現在のデータをすべて置き換えます。よろしいですか？")
                    .default(false)
                    .interact()?;
            if !confirmed {
                println!("インポートを取り消しました");
                return Ok(());
            }
            repo.import_snapshot_str(&text)
                .map_err(HoloError::from)
                .with_context(|| format!("不正なJSON: {}", input.display()))?;
            report_persist_error(&mut repo);
            let snapshot = repo.snapshot();
            println!(
                "✔ インポートしました (露光テスト {}件 / 作成ホログラム {}件)",
                snapshot.test.len(),
                snapshot.product.len()
            );
        }

        Commands::Tab { category: target } => {
            if let Some(target) = target {
                repo.set_active_category(target);
                report_persist_error(&mut repo);
            }
            let active = repo.active_category();
            for c in Category::ALL {
                let mark = if c == active { "▶" } else { " " };
                println!("{} {} ({}) {}件", mark, c.label(), c.key(), repo.list_entries(c).len());
            }
        }

        Commands::Table { mode, area, power } => {
            let mut table = MeasurementTable::build(mode);
            table.compute_shutter_times(area, power);
            println!("{}", mode.list_label());
            print!("{}", view::measurement_table(&table));
        }

        Commands::Config { .. } => unreachable!("設定コマンドは保存ファイルを開く前に処理済み"),
    }

    Ok(())
}

fn print_page(repo: &Repository, category: Category) {
    println!(
        "{}",
        view::page_listing(
            category,
            &repo.page(category),
            repo.page_size(),
            repo.next_number(category)
        )
    );
}

fn report_persist_error(repo: &mut Repository) {
    if let Some(e) = repo.take_persist_error() {
        println!(
            "⚠ 保存に失敗しました（今回の変更は {} に残りません）: {}",
            repo.storage().path().display(),
            e
        );
    }
}
