use chrono::{FixedOffset, NaiveDate};
use famly_fetch::models::famly_records::{DirectImageRaw, SignedImageRaw};
use famly_fetch::models::{CaptureDate, ImageDescriptor, ImageRecord, RecordError};
use serde_json::json;

fn tagged_json() -> serde_json::Value {
    json!({
        "imageId": "b1c2",
        "prefix": "https://img.famly.co/image/abc",
        "width": 1600,
        "height": 1200,
        "key": "xyz/photo.jpg",
        "createdAt": "2024-03-05T10:15:00+01:00"
    })
}

fn note_image_json() -> serde_json::Value {
    json!({
        "id": 987,
        "width": 640,
        "height": 480,
        "secret": {
            "prefix": "https://img.famly.co/secure",
            "key": "k1",
            "path": "p/photo.png",
            "expires": "1700000000"
        }
    })
}

// ============================================================================
// Famly 响应 → 图片描述
// ============================================================================

#[test]
fn test_标记图片记录带时区() {
    let raw: DirectImageRaw = serde_json::from_value(tagged_json()).unwrap();

    let descriptor = ImageDescriptor::from_record(&ImageRecord::direct(raw), false).unwrap();

    assert_eq!(descriptor.img_id, "b1c2");
    assert_eq!(
        descriptor.url(),
        "https://img.famly.co/image/abc/1600x1200/xyz/photo.jpg"
    );
    assert_eq!(descriptor.date.offset(), FixedOffset::east_opt(3600));
    assert_eq!(
        descriptor.date.local(),
        NaiveDate::from_ymd_opt(2024, 3, 5)
            .unwrap()
            .and_hms_opt(10, 15, 0)
            .unwrap()
    );
}

#[test]
fn test_笔记图片使用笔记时间和整数id() {
    let raw: SignedImageRaw = serde_json::from_value(note_image_json()).unwrap();
    let record = ImageRecord::signed(raw)
        .with_date(Some("2024-01-02T08:00:00Z".to_string()))
        .with_caption(Some("Painting - Ms. Smith".to_string()));

    let descriptor = ImageDescriptor::from_record(&record, true).unwrap();

    assert_eq!(descriptor.img_id, "987");
    assert_eq!(
        descriptor.url(),
        "https://img.famly.co/secure/k1/640x480/p/photo.png?expires=1700000000"
    );
    assert_eq!(descriptor.text.as_deref(), Some("Painting - Ms. Smith"));
    assert!(matches!(descriptor.date, CaptureDate::Zoned(_)));
}

#[test]
fn test_未开启说明文字时text为空() {
    let raw: SignedImageRaw = serde_json::from_value(note_image_json()).unwrap();
    let record = ImageRecord::signed(raw)
        .with_date(Some("2024-01-02T08:00:00".to_string()))
        .with_caption(Some("hidden".to_string()));

    let descriptor = ImageDescriptor::from_record(&record, false).unwrap();

    assert_eq!(descriptor.text, None);
    assert!(matches!(descriptor.date, CaptureDate::Naive(_)));
}

// ============================================================================
// 损坏记录
// ============================================================================

#[test]
fn test_无法解析的时间() {
    let mut value = tagged_json();
    value["createdAt"] = json!("yesterday");
    let raw: DirectImageRaw = serde_json::from_value(value).unwrap();

    assert_eq!(
        ImageDescriptor::from_record(&ImageRecord::direct(raw), false),
        Err(RecordError::InvalidDate("yesterday".to_string()))
    );
}

#[test]
fn test_缺少key() {
    let mut value = tagged_json();
    value.as_object_mut().unwrap().remove("key");
    let raw: DirectImageRaw = serde_json::from_value(value).unwrap();

    assert_eq!(
        ImageDescriptor::from_record(&ImageRecord::direct(raw), false),
        Err(RecordError::MissingField("key"))
    );
}

#[test]
fn test_签名图片缺少secret() {
    let mut value = note_image_json();
    value.as_object_mut().unwrap().remove("secret");
    let raw: SignedImageRaw = serde_json::from_value(value).unwrap();
    let record = ImageRecord::signed(raw).with_date(Some("2024-01-02T08:00:00Z".to_string()));

    assert_eq!(
        ImageDescriptor::from_record(&record, false),
        Err(RecordError::MissingField("secret"))
    );
}
