use std::fmt;

use sunny_core::{Sky, Weather};

/// Terminal report with the now, forecast and life-index sections.
pub struct WeatherReport<'a> {
    pub name: &'a str,
    pub weather: &'a Weather,
}

impl fmt::Display for WeatherReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let realtime = &self.weather.realtime;
        let daily = &self.weather.daily;

        writeln!(f, "{}", self.name)?;
        writeln!(
            f,
            "  Now: {} ℃, {}, AQI {}",
            realtime.temperature as i64,
            Sky::from_code(&realtime.sky_condition),
            realtime.air_quality.aqi.chn as i64,
        )?;

        writeln!(f, "\nForecast")?;
        for day in daily.days() {
            let date = match day.sky.day() {
                Some(date) => date.format("%Y-%m-%d").to_string(),
                None => day.sky.date.clone(),
            };
            writeln!(
                f,
                "  {date}  {:<6} {} ~ {} ℃",
                Sky::from_code(&day.sky.value).info(),
                day.min as i64,
                day.max as i64,
            )?;
        }

        if let Some(today) = daily.life_index.today() {
            writeln!(f, "\nLife index")?;
            writeln!(f, "  Cold risk:   {}", today.cold_risk)?;
            writeln!(f, "  Dressing:    {}", today.dressing)?;
            writeln!(f, "  Ultraviolet: {}", today.ultraviolet)?;
            writeln!(f, "  Car washing: {}", today.car_washing)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sunny_core::model::{
        AirQuality, Aqi, DailyForecast, DailySky, LifeDescription, LifeIndex, RealtimeConditions,
        TemperatureRange,
    };

    fn desc(text: &str) -> Vec<LifeDescription> {
        vec![LifeDescription { desc: text.into() }]
    }

    #[test]
    fn report_lists_now_forecast_and_life_index() {
        let weather = Weather {
            realtime: RealtimeConditions {
                temperature: 18.7,
                sky_condition: "LIGHT_RAIN".into(),
                air_quality: AirQuality { aqi: Aqi { chn: 42.0 } },
            },
            daily: DailyForecast {
                skycon: vec![DailySky {
                    value: "CLOUDY".into(),
                    date: "2024-05-01T00:00+08:00".into(),
                }],
                temperature: vec![TemperatureRange { min: 12.4, max: 24.9 }],
                life_index: LifeIndex {
                    cold_risk: desc("少发"),
                    dressing: desc("舒适"),
                    ultraviolet: desc("弱"),
                    car_washing: desc("适宜"),
                },
            },
        };

        let report = WeatherReport { name: "Beijing", weather: &weather }.to_string();

        assert!(report.starts_with("Beijing\n"));
        assert!(report.contains("Now: 18 ℃, 小雨, AQI 42"));
        assert!(report.contains("2024-05-01"));
        assert!(report.contains("12 ~ 24 ℃"));
        assert!(report.contains("Car washing: 适宜"));
    }
}
