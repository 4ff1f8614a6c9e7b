use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct BookingDates {
    pub checkin: NaiveDate,
    pub checkout: NaiveDate,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Booking {
    pub firstname: String,
    pub lastname: String,
    pub totalprice: i64,
    pub depositpaid: bool,
    pub bookingdates: BookingDates,
    #[serde(default)]
    pub additionalneeds: String,
}

impl Booking {
    /// The booking every chain creates.
    pub fn jim_brown() -> Self {
        Self {
            firstname: "Jim".into(),
            lastname: "Brown".into(),
            totalprice: 111,
            depositpaid: true,
            bookingdates: BookingDates {
                checkin: date(2023, 1, 1),
                checkout: date(2023, 1, 2),
            },
            additionalneeds: "Breakfast".into(),
        }
    }

    /// The payload sent when updating a created booking.
    pub fn james_brown() -> Self {
        Self {
            firstname: "James".into(),
            bookingdates: BookingDates {
                checkin: date(2018, 1, 1),
                checkout: date(2019, 1, 1),
            },
            ..Self::jim_brown()
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new<S1: Into<String>, S2: Into<String>>(username: S1, password: S2) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

impl Default for Credentials {
    fn default() -> Self {
        Self::new("admin", "password123")
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct CreatedBooking {
    pub bookingid: i64,
    pub booking: Booking,
}
