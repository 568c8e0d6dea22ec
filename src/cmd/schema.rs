use crate::json_schema;
use std::fs;
use std::path::PathBuf;

pub fn run(command: Option<String>, output_dir: Option<PathBuf>) -> anyhow::Result<()> {
    let schemas = match command {
        Some(ref name) => {
            let schema = json_schema::get_schema(name).ok_or_else(|| {
                anyhow::anyhow!(
                    "no JSON schema for '{}'. Available: {}",
                    name,
                    json_schema::schema_names().join(", ")
                )
            })?;
            vec![(name.clone(), schema)]
        }
        None => json_schema::all_schemas()
            .into_iter()
            .map(|(name, schema)| (name.to_string(), schema))
            .collect(),
    };

    match output_dir {
        Some(dir) => {
            fs::create_dir_all(&dir)?;
            for (name, schema) in &schemas {
                let path = dir.join(format!("{}.schema.json", name));
                fs::write(&path, format!("{}\n", serde_json::to_string_pretty(schema)?))?;
                eprintln!("Wrote {}", path.display());
            }
        }
        None if schemas.len() == 1 => {
            println!("{}", serde_json::to_string_pretty(&schemas[0].1)?);
        }
        None => {
            let all: serde_json::Map<String, serde_json::Value> = schemas
                .into_iter()
                .map(|(name, schema)| Ok((name, serde_json::to_value(schema)?)))
                .collect::<anyhow::Result<_>>()?;
            println!("{}", serde_json::to_string_pretty(&all)?);
        }
    }

    Ok(())
}
