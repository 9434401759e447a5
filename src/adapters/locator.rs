//! Location/weather provider adapters.
//!
//! The provider is best-effort by contract: the service retries a bounded
//! number of times and then falls back to the default profile. These
//! adapters cover the host/simulation cases — a fixed answer, a permanent
//! outage, and an outage that heals after N attempts (for retry tests).

use crate::app::ports::{GeoFix, LocationProvider, WeatherObs};
use crate::error::CommsError;

/// Always answers with a fixed location and weather observation.
pub struct FixedLocator {
    fix: GeoFix,
    weather: WeatherObs,
}

impl FixedLocator {
    pub fn new(lat: f32, lon: f32, city: &str, weather: WeatherObs) -> Self {
        Self {
            fix: GeoFix {
                lat,
                lon,
                city: Some(city.to_string()),
            },
            weather,
        }
    }
}

impl LocationProvider for FixedLocator {
    fn locate(&mut self) -> Result<GeoFix, CommsError> {
        Ok(self.fix.clone())
    }

    fn weather(&mut self) -> Result<WeatherObs, CommsError> {
        Ok(self.weather)
    }
}

/// Never answers — the no-network case.
pub struct OfflineLocator;

impl LocationProvider for OfflineLocator {
    fn locate(&mut self) -> Result<GeoFix, CommsError> {
        Err(CommsError::ProviderUnavailable)
    }

    fn weather(&mut self) -> Result<WeatherObs, CommsError> {
        Err(CommsError::ProviderUnavailable)
    }
}

/// Fails the first `outage` calls of each kind, then behaves like
/// [`FixedLocator`].
pub struct FlakyLocator {
    inner: FixedLocator,
    outage: u8,
    locate_failures: u8,
    weather_failures: u8,
}

impl FlakyLocator {
    pub fn new(inner: FixedLocator, outage: u8) -> Self {
        Self {
            inner,
            outage,
            locate_failures: 0,
            weather_failures: 0,
        }
    }
}

impl LocationProvider for FlakyLocator {
    fn locate(&mut self) -> Result<GeoFix, CommsError> {
        if self.locate_failures < self.outage {
            self.locate_failures += 1;
            return Err(CommsError::ProviderUnavailable);
        }
        self.inner.locate()
    }

    fn weather(&mut self) -> Result<WeatherObs, CommsError> {
        if self.weather_failures < self.outage {
            self.weather_failures += 1;
            return Err(CommsError::ProviderUnavailable);
        }
        self.inner.weather()
    }
}
