use super::{
  types::{AirportRecord, AirportType},
  LoadError,
};
use crate::types::GeoPoint;
use csv::StringRecord;
use log::{debug, warn};

const REQUIRED_COLUMNS: [&str; 4] = ["type", "name", "latitude_deg", "longitude_deg"];

struct Columns {
  headers: Vec<String>,
}

impl Columns {
  fn new(headers: &StringRecord) -> Result<Self, LoadError> {
    let headers: Vec<String> = headers.iter().map(clean_value).collect();
    for required in REQUIRED_COLUMNS {
      if !headers.iter().any(|h| h == required) {
        return Err(LoadError::MissingColumn(required.to_owned()));
      }
    }
    Ok(Self { headers })
  }

  fn get(&self, record: &StringRecord, name: &str) -> String {
    self
      .headers
      .iter()
      .position(|h| h == name)
      .and_then(|idx| record.get(idx))
      .map(clean_value)
      .unwrap_or_default()
  }
}

/// Trims a decoded field and strips one layer of enclosing double quotes.
/// The csv reader already unquotes a field whose quote opens it, only a
/// quote preceded by whitespace reaches here still in place.
pub fn clean_value(value: &str) -> String {
  let trimmed = value.trim();
  let quoted_late = value.starts_with(char::is_whitespace)
    && trimmed.len() >= 2
    && trimmed.starts_with('"')
    && trimmed.ends_with('"');
  if quoted_late {
    trimmed[1..trimmed.len() - 1].to_owned()
  } else {
    trimmed.to_owned()
  }
}

fn reader(raw: &str, has_headers: bool) -> csv::Reader<&[u8]> {
  csv::ReaderBuilder::new()
    .has_headers(has_headers)
    .flexible(true)
    .from_reader(raw.as_bytes())
}

/// Splits one comma-separated line, commas inside quotes are kept
pub fn split_line(line: &str) -> Result<Vec<String>, LoadError> {
  let mut rdr = reader(line, false);
  match rdr.records().next() {
    Some(record) => Ok(record?.iter().map(clean_value).collect()),
    None => Ok(vec![]),
  }
}

pub fn parse_table(raw: &str) -> Result<Vec<AirportRecord>, LoadError> {
  let mut rdr = reader(raw, true);
  let columns = Columns::new(rdr.headers()?)?;

  let mut airports = vec![];
  let mut skipped = 0;
  for (idx, record) in rdr.records().enumerate() {
    let record = record?;
    if record.iter().all(|f| f.trim().is_empty()) {
      continue;
    }
    match parse_record(&columns, &record) {
      Some(airport) => airports.push(airport),
      None => {
        skipped += 1;
        debug!("skipping airport row {} with invalid position", idx + 2);
      }
    }
  }
  if skipped > 0 {
    warn!("{skipped} airport rows skipped due to invalid positions");
  }
  Ok(airports)
}

fn parse_record(cols: &Columns, record: &StringRecord) -> Option<AirportRecord> {
  let lat = cols.get(record, "latitude_deg").parse::<f64>().ok()?;
  let lng = cols.get(record, "longitude_deg").parse::<f64>().ok()?;
  let position = GeoPoint::new(lat, lng).ok()?;
  let elevation_ft = cols.get(record, "elevation_ft").parse::<i32>().ok();

  Some(AirportRecord {
    id: cols.get(record, "id"),
    ident: cols.get(record, "ident"),
    airport_type: AirportType::from(cols.get(record, "type")),
    name: cols.get(record, "name"),
    position,
    elevation_ft,
    continent: cols.get(record, "continent"),
    iso_country: cols.get(record, "iso_country"),
    iso_region: cols.get(record, "iso_region"),
    municipality: cols.get(record, "municipality"),
    scheduled_service: cols.get(record, "scheduled_service") == "yes",
    icao_code: cols.get(record, "icao_code"),
    iata_code: cols.get(record, "iata_code"),
    gps_code: cols.get(record, "gps_code"),
    local_code: cols.get(record, "local_code"),
    home_link: cols.get(record, "home_link"),
    wikipedia_link: cols.get(record, "wikipedia_link"),
    keywords: cols.get(record, "keywords"),
  })
}

#[cfg(test)]
pub mod tests {
  use super::*;

  pub const SAMPLE: &str = r#""id","ident","type","name","latitude_deg","longitude_deg","elevation_ft","continent","iso_country","iso_region","municipality","scheduled_service","icao_code","iata_code","gps_code","local_code","home_link","wikipedia_link","keywords"
3632,"KLAX","large_airport","Los Angeles International Airport",33.942501,-118.407997,125,"NA","US","US-CA","Los Angeles","yes","KLAX","LAX","KLAX","LAX","https://www.flylax.com/","https://en.wikipedia.org/wiki/Los_Angeles_International_Airport","LAX, Los Angeles"
3876,"KVNY","medium_airport","Van Nuys Airport",34.209800,-118.489998,802,"NA","US","US-CA","Van Nuys","no","KVNY","VNY","KVNY","VNY",,,
20000,"KWHP","small_airport","Whiteman Airport",34.259300,-118.413002,1003,"NA","US","US-CA","Los Angeles","no","KWHP","WHP","KWHP","WHP",,,"San Fernando Valley"
20001,"CA01","heliport","Smith, John Heliport",34.1,-118.3,,"NA","US","US-CA","Burbank","no","","","CA01","CA01",,,
20002,"XXXX","small_airport","Broken Row",,-118.3,,"NA","US","US-CA","Nowhere","no","","","","",,,
"#;

  #[test]
  fn test_split_line() {
    let fields = split_line(r#""Smith, John","small_airport""#).unwrap();
    assert_eq!(fields, vec!["Smith, John", "small_airport"]);

    let fields = split_line("a, b ,\"c\"").unwrap();
    assert_eq!(fields.len(), 3);
    assert_eq!(fields[1], "b");
  }

  #[test]
  fn test_clean_value() {
    assert_eq!(clean_value("  \"KLAX\" "), "KLAX");
    assert_eq!(clean_value(" KLAX "), "KLAX");
    assert_eq!(clean_value(" \""), "\"");
    // already unquoted once by the reader
    assert_eq!(clean_value("\"X\""), "\"X\"");
  }

  #[test]
  fn test_one_quote_layer_removed() {
    let fields = split_line(r#""""X""", "KLAX","plain""#).unwrap();
    assert_eq!(fields, vec!["\"X\"", "KLAX", "plain"]);
  }

  #[test]
  fn test_parse_table() {
    let airports = parse_table(SAMPLE).unwrap();
    assert_eq!(airports.len(), 4);

    let lax = &airports[0];
    assert_eq!(lax.icao_code, "KLAX");
    assert_eq!(lax.airport_type, AirportType::LargeAirport);
    assert_eq!(lax.elevation_ft, Some(125));
    assert!(lax.scheduled_service);
    assert_eq!(lax.keywords, "LAX, Los Angeles");

    let heli = &airports[3];
    assert_eq!(heli.name, "Smith, John Heliport");
    assert_eq!(heli.airport_type, AirportType::Heliport);
    assert_eq!(heli.elevation_ft, None);
    assert_eq!(heli.municipality, "Burbank");
  }

  #[test]
  fn test_missing_columns() {
    let res = parse_table("ident,name\nKLAX,Los Angeles\n");
    assert!(matches!(res, Err(LoadError::MissingColumn(_))));
  }
}
