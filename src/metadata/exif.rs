//! EXIF-backed photo metadata

use super::{PhotoMetadata, PhotoTags, StoredLocation, jpeg};
use crate::encode::{EncodedLocation, EncodedTimestamp, Fraction, Triplet};
use crate::error::{Error, Result};
use crate::time::exif::{parse_exif_datetime, parse_gps_stamp};
use exif::experimental::Writer;
use exif::{Context, Exif, Field, In, Rational, Reader, Tag, Value};
use std::fs::{self, File};
use std::io::{BufReader, Cursor};
use std::path::Path;
use tracing::{debug, trace};

/// EXIF tags to try for the capture time, in priority order
const DATE_TAGS: &[Tag] = &[
    Tag::DateTimeOriginal,  // When the original image was taken
    Tag::DateTimeDigitized, // When the image was digitized
    Tag::DateTime,          // File modification date/time
];

/// GPSVersionID written with every location
const GPS_VERSION: [u8; 4] = [2, 0, 0, 0];

/// Photo metadata stored as EXIF
///
/// Any container kamadak-exif understands can be read; writing is limited
/// to JPEG, where the Exif block lives in an APP1 segment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExifFile;

impl ExifFile {
    pub fn new() -> Self {
        Self
    }

    fn load(path: &Path) -> Result<Option<Exif>> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);

        match Reader::new().read_from_container(&mut reader) {
            Ok(exif) => Ok(Some(exif)),
            Err(exif::Error::NotFound(_)) => {
                trace!(?path, "No EXIF data");
                Ok(None)
            }
            Err(e) => Err(Error::ExifRead {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    /// Re-serialize the Exif block of a JPEG with new GPS fields
    ///
    /// Existing fields survive unless `strip_gps` drops the whole GPS IFD or
    /// a field in `gps_fields` replaces them. Fields whose type the writer
    /// cannot encode are lost.
    fn rewrite(path: &Path, strip_gps: bool, gps_fields: &[Field]) -> Result<()> {
        ensure_jpeg(path)?;
        let write_error = |message: String| Error::ExifWrite {
            path: path.to_path_buf(),
            message,
        };

        let data = fs::read(path)?;
        let existing = match jpeg::exif_payload(&data).map_err(|e| write_error(e.to_string()))? {
            Some(tiff) => Some(Reader::new().read_raw(tiff.to_vec()).map_err(|e| {
                Error::ExifRead {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                }
            })?),
            None => None,
        };

        let replaced = |field: &Field| {
            (strip_gps && field.tag.context() == Context::Gps)
                || gps_fields
                    .iter()
                    .any(|new| new.tag == field.tag && new.ifd_num == field.ifd_num)
        };
        let kept: Vec<&Field> = existing
            .iter()
            .flat_map(|exif| exif.fields())
            .filter(|field| !matches!(field.value, Value::Unknown(..)) && !replaced(field))
            .collect();
        let thumbnail = existing.as_ref().and_then(thumbnail);
        let little_endian = existing.as_ref().is_none_or(|exif| exif.little_endian());

        let mut writer = Writer::new();
        for field in kept.iter().copied().chain(gps_fields) {
            writer.push_field(field);
        }
        if let Some(jpeg) = thumbnail {
            writer.set_jpeg(jpeg, In::THUMBNAIL);
        }

        let mut tiff = Cursor::new(Vec::new());
        writer
            .write(&mut tiff, little_endian)
            .map_err(|e| write_error(e.to_string()))?;

        let updated = jpeg::replace_exif(&data, tiff.get_ref()).map_err(|e| write_error(e.to_string()))?;
        fs::write(path, updated)?;

        debug!(
            ?path,
            kept = kept.len(),
            written = gps_fields.len(),
            "Rewrote EXIF block"
        );
        Ok(())
    }
}

impl PhotoMetadata for ExifFile {
    fn read_tags(&self, path: &Path) -> Result<PhotoTags> {
        let Some(exif) = Self::load(path)? else {
            return Ok(PhotoTags::default());
        };

        let capture_time = DATE_TAGS
            .iter()
            .filter_map(|tag| exif.get_field(*tag, In::PRIMARY))
            .filter_map(ascii_text)
            .find(|text| parse_exif_datetime(text).is_some());
        let has_location = exif
            .get_field(Tag::GPSLatitude, In::PRIMARY)
            .and_then(rational_values)
            .is_some_and(|values| values.len() == 3);

        trace!(?path, ?capture_time, has_location, "Read photo tags");
        Ok(PhotoTags {
            capture_time,
            has_location,
        })
    }

    fn read_location(&self, path: &Path) -> Result<Option<StoredLocation>> {
        let Some(exif) = Self::load(path)? else {
            return Ok(None);
        };
        let get = |tag| exif.get_field(tag, In::PRIMARY);

        let Some(lat) = coordinate(get(Tag::GPSLatitude), get(Tag::GPSLatitudeRef), 'S') else {
            return Ok(None);
        };
        let Some(lon) = coordinate(get(Tag::GPSLongitude), get(Tag::GPSLongitudeRef), 'W') else {
            return Ok(None);
        };

        let below_sea_level = get(Tag::GPSAltitudeRef)
            .and_then(|field| field.value.get_uint(0))
            .is_some_and(|reference| reference == 1);
        let elevation = get(Tag::GPSAltitude)
            .and_then(rational_values)
            .and_then(|values| values.first().copied())
            .map(|altitude| if below_sea_level { -altitude } else { altitude });

        let gps_time = match (
            get(Tag::GPSDateStamp).and_then(ascii_text),
            get(Tag::GPSTimeStamp).and_then(rational_values),
        ) {
            (Some(date), Some(time)) if time.len() == 3 => parse_gps_stamp(&date, time[0], time[1], time[2]),
            _ => None,
        };

        Ok(Some(StoredLocation {
            lat,
            lon,
            elevation,
            gps_time,
            datum: get(Tag::GPSMapDatum).and_then(ascii_text),
        }))
    }

    fn write_location(&self, path: &Path, location: &EncodedLocation) -> Result<()> {
        let mut fields = vec![
            gps_field(Tag::GPSVersionID, Value::Byte(GPS_VERSION.to_vec())),
            gps_field(Tag::GPSMapDatum, ascii(&location.datum)),
            gps_field(Tag::GPSLatitudeRef, ascii(&location.latitude_ref.to_string())),
            gps_field(Tag::GPSLatitude, triplet(&location.latitude)?),
            gps_field(Tag::GPSLongitudeRef, ascii(&location.longitude_ref.to_string())),
            gps_field(Tag::GPSLongitude, triplet(&location.longitude)?),
        ];
        if let Some((altitude, reference)) = location.altitude {
            fields.push(gps_field(Tag::GPSAltitudeRef, Value::Byte(vec![reference.as_byte()])));
            fields.push(gps_field(Tag::GPSAltitude, Value::Rational(vec![rational(altitude)?])));
        }
        fields.extend(timestamp_fields(&location.timestamp)?);

        Self::rewrite(path, true, &fields)
    }

    fn remove_location(&self, path: &Path) -> Result<()> {
        let has_gps = Self::load(path)?
            .is_some_and(|exif| exif.fields().any(|field| field.tag.context() == Context::Gps));
        if !has_gps {
            trace!(?path, "No GPS tags to remove");
            return Ok(());
        }
        Self::rewrite(path, true, &[])
    }

    fn write_gps_timestamp(&self, path: &Path, stamp: &EncodedTimestamp) -> Result<()> {
        Self::rewrite(path, false, &timestamp_fields(stamp)?)
    }
}

fn ensure_jpeg(path: &Path) -> Result<()> {
    let is_jpeg = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("jpg") || ext.eq_ignore_ascii_case("jpeg"));
    if is_jpeg {
        Ok(())
    } else {
        Err(Error::UnsupportedFormat {
            path: path.to_path_buf(),
        })
    }
}

fn thumbnail(exif: &Exif) -> Option<&[u8]> {
    let offset = exif
        .get_field(Tag::JPEGInterchangeFormat, In::THUMBNAIL)?
        .value
        .get_uint(0)? as usize;
    let length = exif
        .get_field(Tag::JPEGInterchangeFormatLength, In::THUMBNAIL)?
        .value
        .get_uint(0)? as usize;
    exif.buf().get(offset..offset.checked_add(length)?)
}

fn timestamp_fields(stamp: &EncodedTimestamp) -> Result<[Field; 2]> {
    Ok([
        gps_field(Tag::GPSTimeStamp, triplet(&stamp.time)?),
        gps_field(Tag::GPSDateStamp, ascii(&stamp.date)),
    ])
}

fn gps_field(tag: Tag, value: Value) -> Field {
    Field {
        tag,
        ifd_num: In::PRIMARY,
        value,
    }
}

fn ascii(text: &str) -> Value {
    Value::Ascii(vec![text.as_bytes().to_vec()])
}

fn rational(fraction: Fraction) -> Result<Rational> {
    let invalid = || Error::InvalidRational(fraction.to_string());
    Ok(Rational {
        num: u32::try_from(fraction.num).map_err(|_| invalid())?,
        denom: u32::try_from(fraction.denom).map_err(|_| invalid())?,
    })
}

fn triplet(values: &Triplet) -> Result<Value> {
    let rationals = values.0.iter().map(|f| rational(*f)).collect::<Result<Vec<_>>>()?;
    Ok(Value::Rational(rationals))
}

/// First non-empty string of an ASCII field, without NUL padding
fn ascii_text(field: &Field) -> Option<String> {
    match &field.value {
        Value::Ascii(values) => values
            .iter()
            .map(|bytes| String::from_utf8_lossy(bytes).trim_end_matches('\0').trim().to_string())
            .find(|text| !text.is_empty()),
        _ => None,
    }
}

fn rational_values(field: &Field) -> Option<Vec<f64>> {
    match &field.value {
        Value::Rational(values) => {
            let values: Vec<f64> = values.iter().map(Rational::to_f64).collect();
            values.iter().all(|v| v.is_finite()).then_some(values)
        }
        _ => None,
    }
}

/// Signed decimal degrees from a DMS field and its N/S or E/W reference
fn coordinate(value: Option<&Field>, reference: Option<&Field>, negative: char) -> Option<f64> {
    let values = rational_values(value?)?;
    let [degrees, minutes, seconds] = values.as_slice() else {
        return None;
    };
    let magnitude = degrees + minutes / 60.0 + seconds / 3600.0;

    let is_negative = reference
        .and_then(ascii_text)
        .is_some_and(|text| text.starts_with(negative));
    Some(if is_negative { -magnitude } else { magnitude })
}
