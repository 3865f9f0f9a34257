/*
 *  snapshot.rs
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
use chrono::{DateTime, Datelike, Local, Timelike, Weekday};

use crate::constants::BLINK_ON_MS;
use crate::icons::{condition_icon, WeatherIcon};
use crate::mode::RenderMode;
use crate::weather::WeatherSnapshot;

/// Raw time fields for one frame. No formatting or localization here; the
/// renderer owns 12/24-hour choice, names and separators.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeFields {
    pub hour24: u8,
    /// 1-12, midnight and noon both read 12.
    pub hour12: u8,
    pub is_pm: bool,
    pub minute: u8,
    pub second: u8,
    /// Separator glyphs lit. True for the first half of each second, so a
    /// face ticking on the half second blinks its colons evenly.
    pub blink_on: bool,
    pub year: i32,
    pub month: u8,
    pub day: u8,
    pub weekday: Weekday,
}

impl TimeFields {
    pub fn from_local(now: DateTime<Local>) -> Self {
        let (is_pm, hour12) = now.hour12();
        Self {
            hour24: now.hour() as u8,
            hour12: hour12 as u8,
            is_pm,
            minute: now.minute() as u8,
            second: now.second() as u8,
            blink_on: now.timestamp_subsec_millis() < BLINK_ON_MS,
            year: now.year(),
            month: now.month() as u8,
            day: now.day() as u8,
            weekday: now.weekday(),
        }
    }
}

/// Everything a renderer needs to draw one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FaceSnapshot {
    pub mode: RenderMode,
    pub time: TimeFields,
    pub weather: WeatherSnapshot,
    pub icon: WeatherIcon,
}

/// Assemble a frame from the current time, mode and weather cache.
///
/// Before the first sync the condition code reads as 0, which maps to the
/// placeholder icon rather than no icon at all.
pub fn build_snapshot(
    now: DateTime<Local>,
    mode: RenderMode,
    weather: &WeatherSnapshot,
) -> FaceSnapshot {
    FaceSnapshot {
        mode,
        time: TimeFields::from_local(now),
        weather: weather.clone(),
        icon: condition_icon(weather.condition_id.unwrap_or(0)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn local(h: u32, m: u32, s: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2025, 3, 8, h, m, s).unwrap()
    }

    #[test]
    fn test_blink_follows_subsecond_phase() {
        let on = local(10, 30, 15);
        assert!(TimeFields::from_local(on).blink_on);
        let off = on + chrono::Duration::milliseconds(500);
        assert!(!TimeFields::from_local(off).blink_on);
        let on_again = on + chrono::Duration::milliseconds(1_000);
        assert!(TimeFields::from_local(on_again).blink_on);
    }

    #[test]
    fn test_hour12_midnight_and_noon() {
        let midnight = TimeFields::from_local(local(0, 5, 0));
        assert_eq!(midnight.hour12, 12);
        assert!(!midnight.is_pm);
        assert_eq!(midnight.hour24, 0);

        let noon = TimeFields::from_local(local(12, 5, 0));
        assert_eq!(noon.hour12, 12);
        assert!(noon.is_pm);
        assert_eq!(noon.hour24, 12);

        let evening = TimeFields::from_local(local(21, 45, 30));
        assert_eq!(evening.hour12, 9);
        assert!(evening.is_pm);
    }

    #[test]
    fn test_unsynced_weather_gets_placeholder_icon() {
        let snap = build_snapshot(
            local(8, 0, 0),
            RenderMode::Interactive,
            &WeatherSnapshot::default(),
        );
        assert_eq!(snap.icon, WeatherIcon::Default);
        assert!(!snap.weather.has_data());
    }

    #[test]
    fn test_icon_tracks_condition() {
        let weather = WeatherSnapshot {
            condition_id: Some(800),
            updated_at_ms: 1_000,
            ..Default::default()
        };
        let snap = build_snapshot(local(8, 0, 0), RenderMode::Mute, &weather);
        assert_eq!(snap.icon, WeatherIcon::Clear);
        assert_eq!(snap.mode, RenderMode::Mute);
    }
}
