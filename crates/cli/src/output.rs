use crate::error::CliError;
use model::core::value::Value;
use serde::Serialize;

pub async fn write_json<T: Serialize>(value: &T, path: Option<&str>) -> Result<(), CliError> {
    let json = serde_json::to_string_pretty(value)?;
    match path {
        Some(path) => tokio::fs::write(path, json).await?,
        None => println!("{json}"),
    }
    Ok(())
}

pub fn print_sql(sql: &str, params: &[Value]) {
    println!("{sql}");
    for (i, param) in params.iter().enumerate() {
        println!("  {}: {param}", i + 1);
    }
}
