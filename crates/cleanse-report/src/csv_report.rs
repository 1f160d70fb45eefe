//! Flat CSV error report.

use cleanse_model::{ErrorAccumulator, display_value};

const HEADER: [&str; 9] = [
    "category",
    "severity",
    "type",
    "entity_id",
    "row",
    "field",
    "original",
    "new",
    "message",
];

/// Renders one CSV row per observation, in category then append order.
pub fn render_csv_report(errors: &ErrorAccumulator) -> Result<Vec<u8>, csv::Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(HEADER)?;
    for obs in errors.iter() {
        writer.write_record([
            obs.category.as_str().to_string(),
            obs.severity.as_str().to_string(),
            obs.kind.clone(),
            obs.entity_id.map(|id| id.to_string()).unwrap_or_default(),
            obs.row.map(|row| row.to_string()).unwrap_or_default(),
            obs.field.clone().unwrap_or_default(),
            obs.original.as_ref().map(display_value).unwrap_or_default(),
            obs.new.as_ref().map(display_value).unwrap_or_default(),
            obs.message.clone(),
        ])?;
    }
    writer
        .into_inner()
        .map_err(|err| csv::Error::from(err.into_error()))
}

#[cfg(test)]
mod tests {
    use cleanse_model::{Category, Observation};

    use super::*;

    #[test]
    fn one_row_per_observation() {
        let mut errors = ErrorAccumulator::new();
        errors.push(
            Observation::error(
                Category::Identifier,
                "invalid_siren_checksum",
                "SIREN 051370338 fails the Luhn check",
            )
            .at(0, Some(1))
            .with_field("co_siren")
            .with_original("051370338"),
        );
        let bytes = render_csv_report(&errors).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        insta::assert_snapshot!(text, @r"
        category,severity,type,entity_id,row,field,original,new,message
        identifier,error,invalid_siren_checksum,1,0,co_siren,051370338,,SIREN 051370338 fails the Luhn check
        ");
    }
}
