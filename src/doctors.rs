//! Static doctor directory.
//!
//! Maps each medical specialty to the on-call doctor's SMS number. The
//! directory is fixed for the lifetime of the process; the same specialty
//! names double as appointment categories.

/// Specialty name paired with the on-call phone number.
pub const DIRECTORY: &[(&str, &str)] = &[
    ("Internal Medicine", "+250700000101"),
    ("Surgery", "+250700000102"),
    ("Pediatrics", "+250700000101"),
    ("Obstetrics and Gynecology (OB-GYN)", "+250700000102"),
    ("Dermatology", "+250700000102"),
    ("Psychiatry", "+250700000102"),
    ("Radiology", "+250700000101"),
    ("Pathology", "+250700000101"),
    ("Pharmacy", "+250700000101"),
    ("Critical Care Medicine", "+250700000102"),
    ("Preventive Medicine", "+250700000102"),
    ("Supportive and Allied Health", "+250700000101"),
    ("Anesthesiology", "+250700000102"),
];

/// Look up the contact number for a specialty.
pub fn phone_for(specialty: &str) -> Option<&'static str> {
    DIRECTORY
        .iter()
        .find(|(name, _)| *name == specialty)
        .map(|(_, phone)| *phone)
}
