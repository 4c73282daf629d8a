use anyhow::Result;
use intrinio_lib::Session;

use super::{build_requests, DownloadArgs};
use crate::output::{print_frame, OutputFormat};

pub async fn run(args: &DownloadArgs, session: &Session, format: &OutputFormat) -> Result<()> {
    let requests = build_requests(args)?;
    let frame = session.download_prices(&requests).await?;
    eprintln!("{} price rows for {} tickers", frame.len(), requests.len());
    print_frame(&frame, format)
}
