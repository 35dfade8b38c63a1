use std::path::Path;

fn format_record(out: fern::FormatCallback, message: &std::fmt::Arguments, record: &log::Record) {
    out.finish(format_args! {
        "[{}] {}:{} {} {}",
        record.level(),
        record.file().unwrap_or("?"),
        record.line().unwrap_or(0),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        message
    })
}

/// The countdown owns stdout, so console logs go to stderr.
pub fn init_logger(
    level: log::LevelFilter,
    log_file: Option<&Path>,
) -> Result<(), fern::InitError> {
    let console_config = fern::Dispatch::new()
        .level(level)
        .format(format_record)
        .chain(std::io::stderr());

    let mut base_config = fern::Dispatch::new().chain(console_config);

    if let Some(path) = log_file {
        let file_config = fern::Dispatch::new()
            .level(level)
            .format(format_record)
            .chain(fern::log_file(path)?);
        base_config = base_config.chain(file_config);
    }

    base_config.apply()?;
    Ok(())
}
