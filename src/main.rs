//! CLI biffkit
//!
//! Утилита для просмотра и проверки секций хранилища стола: список групп и
//! записей, декодирование объектов, контрольные суммы, таблицы полей.

use std::{
    fs,
    path::{Path, PathBuf},
    process::ExitCode,
    str::FromStr,
};

use anyhow::{bail, Context, Result};
use biffkit::{
    biff::{read_record, ByteCursor, Digest, FieldOptions, HashAlgorithm, WireKind},
    compute_digest, init_logging,
    items::ItemType,
    read_table, verify_digest, BiffError, LogLevel, RecoveryPolicy, SchemaError, Settings, StackError,
};
use clap::{ArgAction, Parser, Subcommand};
use tracing::{debug, error, warn};

/// Код выхода, когда виноват входной файл (усечён, повреждён, изменён).
const EXIT_BAD_INPUT: u8 = 2;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("GIT_COMMIT"),
    ", built ",
    env!("BUILD_TIME"),
    ")"
);

/// Основная структура CLI аргументов
#[derive(Parser)]
#[command(name = "biffkit")]
#[command(version = env!("CARGO_PKG_VERSION"), long_version = LONG_VERSION)]
#[command(about = "Inspect and verify BIFF record streams of pinball table files", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Файл настроек (по умолчанию `biffkit.toml`, если он есть)
    #[arg(long, global = true, env = "BIFFKIT_CONFIG")]
    config: Option<PathBuf>,
    /// Подробный вывод; повтор (-vv) включает trace
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
    /// Только ошибки
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
    /// Что делать с группой, которую не удалось декодировать
    #[arg(long, global = true, value_enum)]
    on_error: Option<RecoveryPolicy>,
    #[command(subcommand)]
    command: Commands,
}

/// Подкоманды CLI
#[derive(Subcommand)]
enum Commands {
    /// Список групп и их записей без декодирования полей
    Records {
        file: PathBuf,
    },
    /// Декодировать все объекты известных типов
    Inspect {
        file: PathBuf,
        /// Вывод в JSON
        #[arg(long)]
        json: bool,
    },
    /// Контрольная сумма потока записей
    Digest {
        file: PathBuf,
        #[arg(long, value_enum)]
        algorithm: Option<HashAlgorithm>,
    },
    /// Сверить контрольную сумму с ожидаемой
    Verify {
        file: PathBuf,
        /// Ожидаемое значение в hex
        #[arg(long)]
        expected: String,
        #[arg(long, value_enum)]
        algorithm: Option<HashAlgorithm>,
    },
    /// Таблица полей типа в порядке записи
    Schema {
        /// Имя типа, например `HitTarget`
        item_type: String,
    },
    /// Декодировать сырой payload как значение заданного типа
    DecodeField {
        /// int, float, bool, string, wstring, vertex2d, vertex3d, quantized:N
        #[arg(long)]
        kind: String,
        /// Vertex3D с четвёртым float
        #[arg(long)]
        padded: bool,
        payload_file: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => code,
        Err(e) => match codec_error(&e) {
            Some(stack) => {
                if !e.is::<StackError>() && !e.is::<BiffError>() && !e.is::<SchemaError>() {
                    eprintln!("Error: {e}");
                }
                eprintln!("Error: {}", stack.report());
                ExitCode::from(exit_code(&stack))
            }
            None => {
                eprintln!("Error: {e:#}");
                ExitCode::FAILURE
            }
        },
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let mut settings = Settings::load_from(cli.config.as_deref()).context("failed to load settings")?;
    if let Some(policy) = cli.on_error {
        settings.on_group_error = policy;
    }
    settings.logging.adjust_verbosity(cli.verbose, cli.quiet);

    let logging = init_logging(settings.logging.clone()).context("failed to initialize logging")?;
    debug!(?settings, "settings loaded");

    let result = handle_command(&cli.command, &settings);
    if let Some(stack) = result.as_ref().err().and_then(codec_error) {
        log_codec_error(&stack);
    }
    logging.shutdown();
    result
}

/// Ошибка кодека в цепочке причин `anyhow`, если она там есть.
fn codec_error(e: &anyhow::Error) -> Option<StackError> {
    e.chain().find_map(|cause| {
        cause
            .downcast_ref::<StackError>()
            .cloned()
            .or_else(|| cause.downcast_ref::<BiffError>().cloned().map(StackError::new))
            .or_else(|| cause.downcast_ref::<SchemaError>().cloned().map(StackError::new))
    })
}

fn log_codec_error(stack: &StackError) {
    let status = stack.status_code();
    let details = stack.log_message();
    match stack.log_level() {
        LogLevel::Error => error!(%status, details = %details, "command failed"),
        LogLevel::Warn => warn!(%status, details = %details, "command failed"),
        LogLevel::Debug => debug!(%status, details = %details, "command failed"),
    }
}

fn exit_code(stack: &StackError) -> u8 {
    if stack.status_code().is_data_error() {
        EXIT_BAD_INPUT
    } else {
        1
    }
}

/// Обработчик выполнения команд
fn handle_command(
    command: &Commands,
    settings: &Settings,
) -> Result<ExitCode> {
    match command {
        Commands::Records { file } => list_records(&read_file(file)?)?,
        Commands::Inspect { file, json } => inspect(&read_file(file)?, settings, *json)?,
        Commands::Digest { file, algorithm } => {
            let alg = algorithm.unwrap_or(settings.hash_algorithm);
            let digest = compute_digest(&read_file(file)?, alg)?;
            println!("{digest}");
        }
        Commands::Verify {
            file,
            expected,
            algorithm,
        } => {
            let alg = algorithm.unwrap_or(settings.hash_algorithm);
            // принимается и вывод команды digest: `sha256:<hex>`
            let hex = expected.rsplit(':').next().unwrap_or(expected);
            let Some(expected) = Digest::from_hex(alg, hex) else {
                bail!("expected digest '{expected}' is not valid hex");
            };
            match verify_digest(&read_file(file)?, &expected) {
                Ok(digest) => println!("OK {digest}"),
                Err(e) => {
                    eprintln!("MISMATCH: {}", e.report());
                    log_codec_error(&e);
                    return Ok(ExitCode::from(exit_code(&e)));
                }
            }
        }
        Commands::Schema { item_type } => print_schema(item_type)?,
        Commands::DecodeField {
            kind,
            padded,
            payload_file,
        } => decode_field(kind, *padded, &read_file(payload_file)?)?,
    }
    Ok(ExitCode::SUCCESS)
}

fn read_file(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("failed to read {}", path.display()))
}

/// Печатает группы и записи; поля не декодируются.
fn list_records(bytes: &[u8]) -> Result<()> {
    let mut cursor = ByteCursor::new(bytes);
    while !cursor.eof() {
        let offset = cursor.position();
        let discriminator = cursor.read_i32("type discriminator")?;
        let name = ItemType::try_from(discriminator)
            .map(|t| t.to_string())
            .unwrap_or_else(|_| "?".to_string());
        println!("0x{offset:08X} group {discriminator} ({name})");

        while !cursor.eof() {
            let record = read_record(&mut cursor)
                .with_context(|| format!("group at offset 0x{offset:X}"))?;
            println!(
                "  0x{:08X} {} len={}",
                record.offset,
                record.tag,
                record.payload.len()
            );
            if record.is_end() {
                break;
            }
        }
    }
    Ok(())
}

fn inspect(
    bytes: &[u8],
    settings: &Settings,
    json: bool,
) -> Result<()> {
    let (items, stats) = read_table(bytes, settings.on_group_error)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&items)?);
        return Ok(());
    }

    for item in &items {
        println!("{} '{}'", item.item_type(), item.name());
        println!("  {item:?}");
    }
    println!(
        "{} objects, {} groups, {} skipped as unsupported, {} skipped after errors",
        stats.entities, stats.groups, stats.unknown_groups, stats.skipped_groups
    );
    Ok(())
}

fn print_schema(name: &str) -> Result<()> {
    let item_type = ItemType::from_str(name).with_context(|| format!("unknown item type '{name}'"))?;
    let Some(fields) = item_type.field_table()? else {
        bail!("{item_type} has no schema in this build");
    };

    println!("{item_type} (discriminator {})", item_type.discriminator());
    for f in fields {
        let padded = if f.options.padded { " padded" } else { "" };
        println!("  {:>5}  {}  {}{padded}", f.pos, f.tag, f.kind);
    }
    Ok(())
}

fn decode_field(
    kind: &str,
    padded: bool,
    payload: &[u8],
) -> Result<()> {
    let kind = WireKind::from_str(kind)?;
    let mut cursor = ByteCursor::new(payload);
    let value = kind.decode_value(FieldOptions { padded }, &mut cursor)?;
    if !cursor.eof() {
        debug!(extra = cursor.remaining(), "payload has trailing bytes");
    }
    println!("{}", serde_json::to_string(&value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use biffkit::StatusCode;

    use super::*;

    /// Тест проверяет, что ошибка кодека находится под контекстом `anyhow`,
    /// а усечённый файл даёт код выхода для плохого входа.
    #[test]
    fn test_codec_error_behind_context() {
        let err = anyhow::Error::new(BiffError::truncated("record header", 0x10, 8, 3))
            .context("failed to inspect table.bin");

        let stack = codec_error(&err).unwrap();
        assert_eq!(stack.status_code(), StatusCode::UnexpectedEof);
        assert!(stack.report().contains("hint: File may be truncated"));
        assert_eq!(exit_code(&stack), EXIT_BAD_INPUT);
    }

    /// Тест проверяет, что несовпадение суммы тоже считается плохим входом.
    #[test]
    fn test_digest_mismatch_exit_code() {
        let expected = Digest::from_hex(HashAlgorithm::Crc32, "deadbeef").unwrap();
        let stack = verify_digest(&[], &expected).unwrap_err();
        assert_eq!(stack.status_code(), StatusCode::IntegrityMismatch);
        assert!(stack.report().starts_with("Table file checksum mismatch"));
        assert_eq!(exit_code(&stack), EXIT_BAD_INPUT);
    }

    #[test]
    fn test_non_codec_error() {
        let err = anyhow::anyhow!("unknown item type 'Ball'");
        assert!(codec_error(&err).is_none());
    }
}
