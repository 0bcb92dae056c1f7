use std::sync::Arc;

use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;

pub struct TestConfig {
    pub jwt_secret: String,
    pub data_api_url: String,
    pub data_api_key: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "test-secret-key-for-jwt-validation-must-be-long-enough".to_string(),
            data_api_url: "http://localhost:8765".to_string(),
            data_api_key: "test-api-key".to_string(),
        }
    }
}

impl TestConfig {
    /// Point the document store at a mock server (wiremock) base URL.
    pub fn with_store_url(url: &str) -> Self {
        Self {
            data_api_url: url.to_string(),
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            data_api_url: self.data_api_url.clone(),
            data_api_key: self.data_api_key.clone(),
            data_source: "Cluster0".to_string(),
            database_name: "amrutam-test".to_string(),
            jwt_secret: self.jwt_secret.clone(),
            frontend_url: "http://localhost:5173".to_string(),
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }
}

/// Canned Data API response bodies for mocking the document store.
pub struct MockStoreResponses;

impl MockStoreResponses {
    pub fn find(documents: Vec<Value>) -> Value {
        json!({ "documents": documents })
    }

    pub fn find_empty() -> Value {
        json!({ "documents": [] })
    }

    pub fn find_one(document: Value) -> Value {
        json!({ "document": document })
    }

    pub fn find_one_missing() -> Value {
        json!({ "document": null })
    }

    pub fn inserted() -> Value {
        json!({ "insertedId": Uuid::new_v4().to_string() })
    }

    pub fn updated(modified: u64) -> Value {
        json!({ "matchedCount": modified, "modifiedCount": modified })
    }

    pub fn doctor(id: &str) -> Value {
        json!({
            "id": id,
            "fullName": "Dr. Asha Sharma",
            "email": "asha.sharma@example.com",
            "phone": "+919876543210",
            "medicalLicenseNumber": "MH-AYU-12345",
            "specialization": "Panchakarma",
            "experience": 12,
            "qualification": "BAMS, MD (Ayurveda)",
            "registrationBody": "CCIM",
            "clinicName": "Amrutam Wellness Clinic",
            "clinicAddress": {
                "street": "14 MG Road",
                "city": "Pune",
                "state": "Maharashtra",
                "pincode": "411001",
                "country": "India"
            },
            "consultationFee": 500.0,
            "languages": ["Hindi", "English", "Marathi"],
            "isVerified": true,
            "isActive": true,
            "profileComplete": true,
            "availability": [
                {
                    "day": "Monday",
                    "timeSlots": [
                        { "startTime": "09:00", "endTime": "09:30", "isAvailable": true },
                        { "startTime": "09:30", "endTime": "10:00", "isAvailable": true }
                    ]
                }
            ],
            "profilePhoto": "",
            "totalEarnings": 0.0,
            "pendingWithdrawal": 0.0,
            "totalConsultations": 0,
            "rating": 4.6,
            "reviewCount": 18,
            "joinedAt": "2024-01-01T00:00:00Z",
            "createdAt": "2024-01-01T00:00:00Z",
            "updatedAt": "2024-01-01T00:00:00Z"
        })
    }

    pub fn appointment(id: &str, doctor_id: &str) -> Value {
        json!({
            "id": id,
            "doctorId": doctor_id,
            "patientName": "Ravi Kumar",
            "patientEmail": "ravi@example.com",
            "patientPhone": "9812345678",
            "patientAge": 34,
            "appointmentDate": "2030-06-10",
            "appointmentTime": "09:00",
            "duration": 30,
            "appointmentType": "consultation",
            "consultationMode": "video",
            "reasonForVisit": "Persistent acidity",
            "symptoms": ["acidity", "bloating"],
            "urgencyLevel": "medium",
            "status": "scheduled",
            "confirmationStatus": "pending",
            "bookedAt": "2030-06-01T00:00:00Z",
            "bookedBy": "patient",
            "consultationFee": 500.0,
            "paymentStatus": "pending",
            "reschedulingCount": 0,
            "createdAt": "2030-06-01T00:00:00Z",
            "updatedAt": "2030-06-01T00:00:00Z"
        })
    }
}
