/*
 *  icons.rs
 *
 *  WristFace - keeps on ticking
 *	(c) 2025-26 Stuart Hunter
 *
 *	TODO:
 *
 *	This program is free software: you can redistribute it and/or modify
 *	it under the terms of the GNU General Public License as published by
 *	the Free Software Foundation, either version 3 of the License, or
 *	(at your option) any later version.
 *
 *	This program is distributed in the hope that it will be useful,
 *	but WITHOUT ANY WARRANTY; without even the implied warranty of
 *	MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *	GNU General Public License for more details.
 *
 *	See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *	Public License.
 *
 */
use std::fmt;

/// Icon classes the renderer can draw. Derived from OpenWeatherMap-style
/// condition codes; the art itself belongs to the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeatherIcon {
    Storm,
    LightRain,
    Rain,
    Snow,
    Fog,
    Clear,
    LightClouds,
    Cloudy,
    /// Placeholder shown before the first sync (condition code 0).
    Default,
    /// Code outside every band; the renderer draws nothing.
    None,
}

impl fmt::Display for WeatherIcon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            WeatherIcon::Storm => "storm",
            WeatherIcon::LightRain => "light rain",
            WeatherIcon::Rain => "rain",
            WeatherIcon::Snow => "snow",
            WeatherIcon::Fog => "fog",
            WeatherIcon::Clear => "clear",
            WeatherIcon::LightClouds => "light clouds",
            WeatherIcon::Cloudy => "cloudy",
            WeatherIcon::Default => "default",
            WeatherIcon::None => "none",
        };
        write!(f, "{}", label)
    }
}

/// Map a condition code to its icon class.
///
/// Band order matters: 761 sits inside the fog band, so of the volcanic
/// pair only 781 lands on storm. An unknown code is not an error, the
/// face simply shows no icon.
pub fn condition_icon(condition_id: i32) -> WeatherIcon {
    match condition_id {
        200..=232 => WeatherIcon::Storm,
        300..=321 => WeatherIcon::LightRain,
        500..=504 => WeatherIcon::Rain,
        511 => WeatherIcon::Snow,
        520..=531 => WeatherIcon::Rain,
        600..=622 => WeatherIcon::Snow,
        701..=761 => WeatherIcon::Fog,
        781 => WeatherIcon::Storm,
        800 => WeatherIcon::Clear,
        801 => WeatherIcon::LightClouds,
        802..=804 => WeatherIcon::Cloudy,
        0 => WeatherIcon::Default,
        _ => WeatherIcon::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_edges() {
        assert_eq!(condition_icon(200), WeatherIcon::Storm);
        assert_eq!(condition_icon(232), WeatherIcon::Storm);
        assert_eq!(condition_icon(233), WeatherIcon::None);
        assert_eq!(condition_icon(300), WeatherIcon::LightRain);
        assert_eq!(condition_icon(321), WeatherIcon::LightRain);
        assert_eq!(condition_icon(500), WeatherIcon::Rain);
        assert_eq!(condition_icon(504), WeatherIcon::Rain);
        assert_eq!(condition_icon(505), WeatherIcon::None);
        assert_eq!(condition_icon(520), WeatherIcon::Rain);
        assert_eq!(condition_icon(531), WeatherIcon::Rain);
        assert_eq!(condition_icon(600), WeatherIcon::Snow);
        assert_eq!(condition_icon(622), WeatherIcon::Snow);
        assert_eq!(condition_icon(701), WeatherIcon::Fog);
        assert_eq!(condition_icon(800), WeatherIcon::Clear);
        assert_eq!(condition_icon(801), WeatherIcon::LightClouds);
        assert_eq!(condition_icon(802), WeatherIcon::Cloudy);
        assert_eq!(condition_icon(804), WeatherIcon::Cloudy);
        assert_eq!(condition_icon(805), WeatherIcon::None);
    }

    #[test]
    fn test_freezing_rain_is_snow() {
        assert_eq!(condition_icon(511), WeatherIcon::Snow);
        assert_eq!(condition_icon(510), WeatherIcon::None);
        assert_eq!(condition_icon(512), WeatherIcon::None);
    }

    #[test]
    fn test_volcanic_pair_split_by_fog_band() {
        assert_eq!(condition_icon(761), WeatherIcon::Fog);
        assert_eq!(condition_icon(781), WeatherIcon::Storm);
        assert_eq!(condition_icon(762), WeatherIcon::None);
    }

    #[test]
    fn test_sentinels() {
        assert_eq!(condition_icon(0), WeatherIcon::Default);
        assert_eq!(condition_icon(999), WeatherIcon::None);
        assert_eq!(condition_icon(-7), WeatherIcon::None);
    }
}
