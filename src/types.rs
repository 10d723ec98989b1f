//! Categorical types shared by donor and hospital records.

use std::fmt;

/// ABO/Rh blood groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BloodType {
    /// A positive
    #[cfg_attr(feature = "serde", serde(rename = "A+"))]
    APositive,
    /// A negative
    #[cfg_attr(feature = "serde", serde(rename = "A-"))]
    ANegative,
    /// B positive
    #[cfg_attr(feature = "serde", serde(rename = "B+"))]
    BPositive,
    /// B negative
    #[cfg_attr(feature = "serde", serde(rename = "B-"))]
    BNegative,
    /// AB positive
    #[cfg_attr(feature = "serde", serde(rename = "AB+"))]
    AbPositive,
    /// AB negative
    #[cfg_attr(feature = "serde", serde(rename = "AB-"))]
    AbNegative,
    /// O positive
    #[cfg_attr(feature = "serde", serde(rename = "O+"))]
    OPositive,
    /// O negative
    #[cfg_attr(feature = "serde", serde(rename = "O-"))]
    ONegative,
}

impl BloodType {
    /// Every blood group, in display order.
    pub const ALL: [BloodType; 8] = [
        BloodType::APositive,
        BloodType::ANegative,
        BloodType::BPositive,
        BloodType::BNegative,
        BloodType::AbPositive,
        BloodType::AbNegative,
        BloodType::OPositive,
        BloodType::ONegative,
    ];

    /// Conventional notation, e.g. `"O+"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            BloodType::APositive => "A+",
            BloodType::ANegative => "A-",
            BloodType::BPositive => "B+",
            BloodType::BNegative => "B-",
            BloodType::AbPositive => "AB+",
            BloodType::AbNegative => "AB-",
            BloodType::OPositive => "O+",
            BloodType::ONegative => "O-",
        }
    }

    /// Parse conventional notation. Case and surrounding whitespace are ignored.
    pub fn from_code(code: &str) -> Option<Self> {
        let code = code.trim().to_ascii_uppercase();
        Self::ALL.into_iter().find(|bt| bt.as_str() == code)
    }
}

impl fmt::Display for BloodType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ownership category of a hospital.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(from = "String", into = "String")
)]
pub enum HospitalType {
    /// Government hospital
    Government,
    /// Private hospital
    Private,
    /// NGO or mission hospital
    NonProfit,
    /// Teaching/referral hospital attached to a university
    Teaching,
    /// Any other category, stored verbatim
    Custom(String),
}

impl HospitalType {
    /// Display label.
    pub fn as_str(&self) -> &str {
        match self {
            HospitalType::Government => "Government",
            HospitalType::Private => "Private",
            HospitalType::NonProfit => "Non-profit",
            HospitalType::Teaching => "Teaching",
            HospitalType::Custom(label) => label,
        }
    }

    /// Parse a label, falling back to [`HospitalType::Custom`].
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "government" | "public" => HospitalType::Government,
            "private" => HospitalType::Private,
            "non-profit" | "nonprofit" | "ngo" => HospitalType::NonProfit,
            "teaching" | "referral" => HospitalType::Teaching,
            _ => HospitalType::Custom(label.trim().to_string()),
        }
    }
}

impl fmt::Display for HospitalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for HospitalType {
    fn from(label: String) -> Self {
        HospitalType::from_label(&label)
    }
}

impl From<HospitalType> for String {
    fn from(kind: HospitalType) -> Self {
        kind.as_str().to_string()
    }
}

/// Donor gender as recorded on the registration form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Gender {
    /// Male
    Male,
    /// Female
    Female,
}

impl Gender {
    /// Lowercase label used in storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }

    /// Parse a label; anything unrecognised is treated as not recorded.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "male" | "m" => Some(Gender::Male),
            "female" | "f" => Some(Gender::Female),
            _ => None,
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
