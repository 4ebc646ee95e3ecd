//! REF^I12 referral mapping.
//!
//! [`ReferralFields`] holds the leaf values pulled from a message, one per
//! fixed address. [`ReferralDocument`] is the output record built from them.
//! Its key set never changes: a missing source value shows up as an empty
//! string, or as `null` for the appointment duration.

use serde::{Deserialize, Serialize};
use serde_json::Number;

use crate::entity::Entity;
use crate::extraction::{Extractor, FieldPath};
use crate::timestamp::hl7_datetime_to_iso;

/// Declares the leaf-value struct together with its address table so the
/// two cannot drift apart.
macro_rules! referral_fields {
    ($( $(#[$doc:meta])* $name:ident => ($segment:literal, $field:literal, $component:literal) ),+ $(,)?) => {
        /// Raw leaf values extracted from a REF^I12 message.
        ///
        /// Every field is the display string found at its address, or `""`
        /// when the address is absent.
        #[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
        pub struct ReferralFields {
            $( $(#[$doc])* pub $name: String, )+
        }

        impl ReferralFields {
            /// Leaf name and `(segment, field, component)` for every value.
            pub const ADDRESSES: &'static [(&'static str, &'static str, usize, usize)] = &[
                $( (stringify!($name), $segment, $field, $component), )+
            ];

            /// Resolve every leaf from a message. Never fails.
            pub fn extract<E: Extractor + ?Sized>(source: &E) -> Self {
                Self {
                    $( $name: source.extract_or_empty(&FieldPath::new($segment, $field, $component)), )+
                }
            }

            /// Leaf names and values in address-table order.
            pub fn entries(&self) -> Vec<(&'static str, &str)> {
                vec![ $( (stringify!($name), self.$name.as_str()), )+ ]
            }
        }
    };
}

referral_fields! {
    /// MSH-9.1 message code (`REF`)
    message_code => ("MSH", 9, 1),
    /// MSH-9.2 trigger event (`I12`)
    trigger_event => ("MSH", 9, 2),

    /// RF1-1 referral status
    referral_status => ("RF1", 1, 1),
    /// RF1-2 referral priority
    referral_priority => ("RF1", 2, 1),
    /// RF1-3 referred-to service
    referral_service => ("RF1", 3, 1),
    /// RF1-9 effective date, HL7 timestamp
    referral_timestamp => ("RF1", 9, 1),

    mrn => ("PID", 3, 1),
    assigning_authority => ("PID", 3, 4),
    identifier_type => ("PID", 3, 5),
    last_name => ("PID", 5, 1),
    first_name => ("PID", 5, 2),
    /// PID-7 date of birth, HL7 timestamp
    dob_timestamp => ("PID", 7, 1),
    sex => ("PID", 8, 1),

    patient_class => ("PV1", 2, 1),
    location => ("PV1", 3, 1),
    room => ("PV1", 3, 2),

    /// PV1-7 attending doctor
    provider_id => ("PV1", 7, 1),
    provider_last_name => ("PV1", 7, 2),
    provider_first_name => ("PV1", 7, 3),

    appointment_id => ("SCH", 2, 1),
    appointment_duration => ("SCH", 6, 1),
    appointment_duration_unit => ("SCH", 7, 1),
    appointment_start_timestamp => ("SCH", 11, 1),
    appointment_end_timestamp => ("SCH", 12, 1),
    appointment_status => ("SCH", 16, 1),

    /// AIG-3 resource identifier, used as the clinic code
    clinic_code => ("AIG", 3, 1),
}

impl ReferralFields {
    /// Every address as a [`FieldPath`], paired with its leaf name.
    pub fn addresses() -> Vec<(&'static str, FieldPath)> {
        Self::ADDRESSES
            .iter()
            .map(|(name, segment, field, component)| {
                (*name, FieldPath::new(*segment, *field, *component))
            })
            .collect()
    }

    /// Every address as a [`FieldPath`], in table order.
    pub fn paths() -> Vec<FieldPath> {
        Self::addresses().into_iter().map(|(_, path)| path).collect()
    }
}

/// The JSON document produced for one referral message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferralDocument {
    /// `code^event`, e.g. `REF^I12`
    pub message_type: String,
    pub referral: Referral,
    pub patient: Patient,
    pub visit: Visit,
    pub provider: Provider,
    pub appointment: Appointment,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Referral {
    pub status: String,
    pub priority: String,
    pub service: String,
    pub referral_datetime: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patient {
    pub mrn: String,
    pub assigning_authority: String,
    pub identifier_type: String,
    pub last_name: String,
    pub first_name: String,
    pub dob: String,
    pub sex: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Visit {
    pub patient_class: String,
    pub location: String,
    pub room: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provider {
    pub id: String,
    pub last_name: String,
    pub first_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: String,
    pub start: String,
    pub end: String,
    /// `None` serializes as `null` when SCH-6 was empty
    pub duration: Option<Number>,
    pub duration_unit: String,
    pub status: String,
    pub clinic: String,
}

impl ReferralDocument {
    /// Assemble the document from extracted leaf values.
    pub fn build(fields: &ReferralFields) -> Self {
        Self {
            message_type: compose_message_type(&fields.message_code, &fields.trigger_event),
            referral: Referral {
                status: fields.referral_status.clone(),
                priority: fields.referral_priority.clone(),
                service: fields.referral_service.clone(),
                referral_datetime: hl7_datetime_to_iso(&fields.referral_timestamp),
            },
            patient: Patient {
                mrn: fields.mrn.clone(),
                assigning_authority: fields.assigning_authority.clone(),
                identifier_type: fields.identifier_type.clone(),
                last_name: fields.last_name.clone(),
                first_name: fields.first_name.clone(),
                dob: hl7_datetime_to_iso(&fields.dob_timestamp),
                sex: fields.sex.clone(),
            },
            visit: Visit {
                patient_class: fields.patient_class.clone(),
                location: fields.location.clone(),
                room: fields.room.clone(),
            },
            provider: Provider {
                id: fields.provider_id.clone(),
                last_name: fields.provider_last_name.clone(),
                first_name: fields.provider_first_name.clone(),
            },
            appointment: Appointment {
                id: fields.appointment_id.clone(),
                start: hl7_datetime_to_iso(&fields.appointment_start_timestamp),
                end: hl7_datetime_to_iso(&fields.appointment_end_timestamp),
                duration: coerce_duration(&fields.appointment_duration),
                duration_unit: fields.appointment_duration_unit.clone(),
                status: fields.appointment_status.clone(),
                clinic: fields.clinic_code.clone(),
            },
        }
    }

    /// Extract and build in one step.
    pub fn from_message<E: Extractor + ?Sized>(source: &E) -> Self {
        Self::build(&ReferralFields::extract(source))
    }
}

impl Entity for ReferralDocument {}

/// `code + "^" + event`, even when either side is empty.
pub fn compose_message_type(code: &str, event: &str) -> String {
    format!("{}^{}", code, event)
}

/// Numeric reading of the appointment duration.
///
/// An empty string has no value and maps to `None`, which is distinct from
/// zero. Otherwise surrounding whitespace is ignored, a blank string reads
/// as `0`, integral values stay integers and unreadable or non-finite input
/// maps to `None`, since JSON has no NaN.
pub fn coerce_duration(raw: &str) -> Option<Number> {
    if raw.is_empty() {
        return None;
    }

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Some(Number::from(0));
    }

    if let Ok(int) = trimmed.parse::<i64>() {
        return Some(Number::from(int));
    }
    if let Ok(int) = trimmed.parse::<u64>() {
        return Some(Number::from(int));
    }

    let float = trimmed.parse::<f64>().ok().filter(|f| f.is_finite())?;
    if float.fract() == 0.0 {
        if float.abs() < i64::MAX as f64 {
            return Some(Number::from(float as i64));
        }
        if float > 0.0 && float < u64::MAX as f64 {
            return Some(Number::from(float as u64));
        }
    }
    Number::from_f64(float)
}
