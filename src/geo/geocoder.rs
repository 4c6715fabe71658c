//! Turning a free-text address into a coordinate.
//!
//! The daemon only needs one best match per query, so the [`Geocoder`] trait
//! returns a single [`Place`]. The built-in [`CityGeocoder`] searches the
//! offline world-city table shipped with the `cities` crate and also accepts a
//! literal `"lat, lon"` pair, which is handy for places too small to be listed.

use std::fmt;

use super::coordinate::Coordinate;

/// Result of a successful lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct Place {
    pub coordinate: Coordinate,
    pub display_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeocodeError {
    /// The query was empty or whitespace only.
    EmptyQuery,
    /// Nothing matched the query.
    NoMatch(String),
    /// The lookup itself could not be performed.
    Unavailable(String),
}

impl fmt::Display for GeocodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeocodeError::EmptyQuery => write!(f, "Please enter a location"),
            GeocodeError::NoMatch(query) => write!(f, "Location not found: {query}"),
            GeocodeError::Unavailable(reason) => write!(f, "Error finding location: {reason}"),
        }
    }
}

impl std::error::Error for GeocodeError {}

/// Address lookup used by the location request workers.
pub trait Geocoder: Send + Sync {
    fn geocode(&self, query: &str) -> Result<Place, GeocodeError>;
}

/// One searchable row of the city table.
#[derive(Debug, Clone)]
pub struct CityEntry {
    pub name: String,
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl CityEntry {
    fn display_name(&self) -> String {
        if self.country.is_empty() {
            self.name.clone()
        } else {
            format!("{}, {}", self.name, self.country)
        }
    }
}

/// Offline geocoder over a table of world cities.
///
/// Matching is case-insensitive: an exact name match wins over a prefix match,
/// which wins over a substring match. A query of the form `"city, country"`
/// restricts candidates to countries containing the second part.
pub struct CityGeocoder {
    entries: Vec<CityEntry>,
}

impl CityGeocoder {
    /// Geocoder over the bundled world-city database.
    pub fn world() -> Self {
        let entries = cities::all()
            .iter()
            .map(|c| CityEntry {
                name: c.city.to_string(),
                country: c.country.to_string(),
                latitude: c.latitude,
                longitude: c.longitude,
            })
            .collect();
        Self { entries }
    }

    pub fn with_entries(entries: Vec<CityEntry>) -> Self {
        Self { entries }
    }

    fn best_match(&self, city: &str, country: Option<&str>) -> Option<&CityEntry> {
        let city = city.to_lowercase();
        let country = country.map(str::to_lowercase);

        let candidates: Vec<(&CityEntry, String)> = self
            .entries
            .iter()
            .filter(|e| match &country {
                Some(wanted) => e.country.to_lowercase().contains(wanted.as_str()),
                None => true,
            })
            .map(|e| (e, e.name.to_lowercase()))
            .collect();

        candidates
            .iter()
            .find(|(_, name)| *name == city)
            .or_else(|| candidates.iter().find(|(_, name)| name.starts_with(&city)))
            .or_else(|| candidates.iter().find(|(_, name)| name.contains(&city)))
            .map(|(entry, _)| *entry)
    }
}

impl Geocoder for CityGeocoder {
    fn geocode(&self, query: &str) -> Result<Place, GeocodeError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(GeocodeError::EmptyQuery);
        }

        if let Some(coordinate) = parse_literal(query) {
            return Ok(Place {
                display_name: coordinate.to_string(),
                coordinate,
            });
        }

        let (city, country) = match query.split_once(',') {
            Some((city, country)) if !country.trim().is_empty() => {
                (city.trim(), Some(country.trim()))
            }
            Some((city, _)) => (city.trim(), None),
            None => (query, None),
        };
        if city.is_empty() {
            return Err(GeocodeError::NoMatch(query.to_string()));
        }

        let entry = self
            .best_match(city, country)
            .ok_or_else(|| GeocodeError::NoMatch(query.to_string()))?;

        let coordinate = Coordinate::new(entry.latitude, entry.longitude).map_err(|e| {
            GeocodeError::Unavailable(format!("bad coordinates for {}: {e}", entry.name))
        })?;

        Ok(Place {
            coordinate,
            display_name: entry.display_name(),
        })
    }
}

/// Parse `"lat, lon"` (comma and/or whitespace separated) as a coordinate.
pub fn parse_literal(query: &str) -> Option<Coordinate> {
    let mut parts = query
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|p| !p.is_empty());
    let latitude = parts.next()?.parse::<f64>().ok()?;
    let longitude = parts.next()?.parse::<f64>().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Coordinate::new(latitude, longitude).ok()
}
