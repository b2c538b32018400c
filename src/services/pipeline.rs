use crate::error::AppError;
use crate::models::comparison::ComparisonReport;
use crate::models::config::AppConfig;
use crate::models::image_source::{ImageId, ImageSource};
use crate::models::ocr_result::ImageAnalysis;
use crate::services::comparator;
use crate::services::ocr::{decode_image, extract_temperature, OcrEngine, PreprocessingService, TesseractEngine};
use crate::services::session::Session;
use crate::services::weather::WeatherClient;
use image::RgbImage;
use parking_lot::Mutex;

/// Image → text → temperature, joined with the weather lookup on compare.
///
/// Holds no per-user state; every call takes the caller's `Session`.
pub struct ThermoCheck {
    ocr: Box<dyn OcrEngine>,
    preprocessing: PreprocessingService,
    weather: WeatherClient,
    default_city: String,
}

impl ThermoCheck {
    pub fn new(
        ocr: Box<dyn OcrEngine>,
        preprocessing: PreprocessingService,
        weather: WeatherClient,
        default_city: impl Into<String>,
    ) -> Self {
        Self {
            ocr,
            preprocessing,
            weather,
            default_city: default_city.into(),
        }
    }

    /// Build the production pipeline: system tesseract plus OpenWeatherMap.
    ///
    /// Fails with `OcrError::Unavailable` when tesseract cannot be found.
    pub fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        let ocr = TesseractEngine::new(&config.ocr)?;
        let weather = WeatherClient::from_env(&config.weather)?;

        Ok(Self::new(
            Box::new(ocr),
            PreprocessingService::new(&config.ocr),
            weather,
            config.weather.default_city.clone(),
        ))
    }

    pub fn default_city(&self) -> &str {
        &self.default_city
    }

    /// Decode an image, make it the session's active image and extract its temperature.
    ///
    /// A decode failure leaves the session untouched. A new image (or a new
    /// source) clears the previous text and temperature before OCR runs.
    /// Re-submitting the active image returns the recorded result.
    pub fn analyze_image(
        &self,
        session: &mut Session,
        source: ImageSource,
        bytes: &[u8],
    ) -> Result<ImageAnalysis, AppError> {
        let decoded = DecodedImage::new(source, bytes)?;
        let replaced = match activate(session, &decoded) {
            Activation::Cached(analysis) => return Ok(analysis),
            Activation::Fresh { replaced } => replaced,
        };

        let (raw_text, temperature) = self.recognize(&decoded)?;
        session.record_analysis(&decoded.id, raw_text.clone(), temperature);

        Ok(decoded.into_analysis(raw_text, temperature, replaced))
    }

    /// Same as [`analyze_image`](Self::analyze_image) for a session shared
    /// between threads.
    ///
    /// The lock is only taken to activate the image and to record the result,
    /// never while OCR runs. If another caller switched the source or image in
    /// the meantime, the result is returned but not recorded.
    pub fn analyze_shared(
        &self,
        session: &Mutex<Session>,
        source: ImageSource,
        bytes: &[u8],
    ) -> Result<ImageAnalysis, AppError> {
        let decoded = DecodedImage::new(source, bytes)?;
        let activation = activate(&mut session.lock(), &decoded);
        let replaced = match activation {
            Activation::Cached(analysis) => return Ok(analysis),
            Activation::Fresh { replaced } => replaced,
        };

        let (raw_text, temperature) = self.recognize(&decoded)?;
        if !session
            .lock()
            .record_analysis(&decoded.id, raw_text.clone(), temperature)
        {
            tracing::debug!(fingerprint = %decoded.id.fingerprint, "Image superseded during OCR");
        }

        Ok(decoded.into_analysis(raw_text, temperature, replaced))
    }

    fn recognize(&self, decoded: &DecodedImage) -> Result<(String, Option<i32>), AppError> {
        tracing::info!(
            source = %decoded.id.source,
            width = decoded.dimensions.0,
            height = decoded.dimensions.1,
            engine = self.ocr.name(),
            "Running OCR"
        );

        let gray = self.preprocessing.prepare(&decoded.rgb);
        let raw_text = self.ocr.recognize(&gray)?;
        let temperature = extract_temperature(&raw_text);

        tracing::debug!(raw_text = %raw_text.trim(), "OCR output");
        match temperature {
            Some(value) => tracing::info!(temperature = value, "Extracted temperature"),
            None => tracing::warn!("No temperature value detected"),
        }

        Ok((raw_text, temperature))
    }

    /// Compare the session's extracted temperature with the live reading for `city`
    pub async fn compare(&self, session: &Session, city: Option<&str>) -> ComparisonReport {
        self.compare_temperature(session.temperature(), city).await
    }

    /// Compare `extracted` with the live reading for `city` (default city when `None`).
    ///
    /// The lookup always runs, even without an extracted value, so city
    /// errors are reported on their own.
    pub async fn compare_temperature(&self, extracted: Option<i32>, city: Option<&str>) -> ComparisonReport {
        let city = city.unwrap_or(&self.default_city);
        let lookup = self.weather.current_reading(city).await;

        let report = comparator::build_report(city, extracted, lookup);
        tracing::info!(city, result = ?report.result, "Comparison finished");
        report
    }
}

struct DecodedImage {
    id: ImageId,
    rgb: RgbImage,
    dimensions: (u32, u32),
}

impl DecodedImage {
    fn new(source: ImageSource, bytes: &[u8]) -> Result<Self, AppError> {
        let rgb = decode_image(bytes)?;
        Ok(Self {
            id: ImageId::from_bytes(source, bytes),
            dimensions: rgb.dimensions(),
            rgb,
        })
    }

    fn into_analysis(self, raw_text: String, temperature: Option<i32>, replaced: bool) -> ImageAnalysis {
        ImageAnalysis::new(self.id, self.dimensions, raw_text, temperature, replaced)
    }
}

enum Activation {
    /// The image was already active and analyzed
    Cached(ImageAnalysis),
    Fresh { replaced: bool },
}

fn activate(session: &mut Session, decoded: &DecodedImage) -> Activation {
    let replaced = session.activate(decoded.id.clone());
    if !replaced {
        if let Some(text) = session.raw_text() {
            tracing::debug!(fingerprint = %decoded.id.fingerprint, "Image unchanged, reusing analysis");
            return Activation::Cached(ImageAnalysis::new(
                decoded.id.clone(),
                decoded.dimensions,
                text.to_string(),
                session.temperature(),
                false,
            ));
        }
    }
    Activation::Fresh { replaced }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ImageError, OcrError};
    use crate::models::comparison::{ComparisonResult, IncompleteReason};
    use crate::models::config::WeatherConfig;
    use image::{GrayImage, ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// OCR stand-in returning canned text and counting calls
    struct FakeOcr {
        text: String,
        calls: Arc<AtomicUsize>,
    }

    impl OcrEngine for FakeOcr {
        fn recognize(&self, _image: &GrayImage) -> Result<String, OcrError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.text.clone())
        }

        fn name(&self) -> &str {
            "fake"
        }
    }

    struct FailingOcr;

    impl OcrEngine for FailingOcr {
        fn recognize(&self, _image: &GrayImage) -> Result<String, OcrError> {
            Err(OcrError::Recognition("engine crashed".to_string()))
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    fn png_bytes(shade: u8) -> Vec<u8> {
        let img = RgbImage::from_pixel(32, 16, Rgb([shade, shade, shade]));
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png).unwrap();
        bytes
    }

    fn weather_client(base_url: &str) -> WeatherClient {
        let config = WeatherConfig {
            base_url: base_url.to_string(),
            timeout_secs: 5,
            ..WeatherConfig::default()
        };
        WeatherClient::new(&config, Some("test-key".to_string())).unwrap()
    }

    fn pipeline_with(text: &str, base_url: &str) -> (ThermoCheck, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let ocr = FakeOcr {
            text: text.to_string(),
            calls: Arc::clone(&calls),
        };
        let pipeline = ThermoCheck::new(
            Box::new(ocr),
            PreprocessingService::default(),
            weather_client(base_url),
            "Dhaka",
        );
        (pipeline, calls)
    }

    async fn mock_weather(server: &MockServer, city: &str, temp: f64) {
        Mock::given(method("GET"))
            .and(path("/data/2.5/weather"))
            .and(query_param("q", city))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "name": city,
                "main": { "temp": temp }
            })))
            .mount(server)
            .await;
    }

    #[test]
    fn test_analyze_extracts_temperature() {
        let (pipeline, _) = pipeline_with("Current reading: 25°C outside", "http://127.0.0.1:9");
        let mut session = Session::new();

        let analysis = pipeline
            .analyze_image(&mut session, ImageSource::Upload, &png_bytes(200))
            .unwrap();

        assert_eq!(analysis.temperature, Some(25));
        assert_eq!((analysis.width, analysis.height), (32, 16));
        assert!(analysis.warning.is_none());
        assert!(analysis.replaced_previous);
        assert_eq!(session.temperature(), Some(25));
    }

    #[test]
    fn test_analyze_without_temperature_warns() {
        let (pipeline, _) = pipeline_with("no readable digits here", "http://127.0.0.1:9");
        let mut session = Session::new();

        let analysis = pipeline
            .analyze_image(&mut session, ImageSource::Camera, &png_bytes(10))
            .unwrap();

        assert!(analysis.temperature.is_none());
        assert!(analysis.warning.is_some());
        assert_eq!(session.raw_text(), Some("no readable digits here"));
    }

    #[test]
    fn test_same_image_is_not_recognized_twice() {
        let (pipeline, calls) = pipeline_with("21°", "http://127.0.0.1:9");
        let mut session = Session::new();
        let bytes = png_bytes(50);

        pipeline.analyze_image(&mut session, ImageSource::Upload, &bytes).unwrap();
        let again = pipeline.analyze_image(&mut session, ImageSource::Upload, &bytes).unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(again.temperature, Some(21));
        assert!(!again.replaced_previous);
    }

    #[test]
    fn test_decode_failure_leaves_session_untouched() {
        let (pipeline, calls) = pipeline_with("25°", "http://127.0.0.1:9");
        let mut session = Session::new();
        pipeline.analyze_image(&mut session, ImageSource::Upload, &png_bytes(80)).unwrap();
        let before = session.clone();

        let err = pipeline
            .analyze_image(&mut session, ImageSource::Camera, b"not an image")
            .unwrap_err();

        assert!(matches!(err, AppError::Image(ImageError::Decode(_))));
        assert_eq!(session, before);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_ocr_failure_does_not_keep_stale_temperature() {
        let (good, _) = pipeline_with("25°", "http://127.0.0.1:9");
        let mut session = Session::new();
        good.analyze_image(&mut session, ImageSource::Upload, &png_bytes(80)).unwrap();

        let failing = ThermoCheck::new(
            Box::new(FailingOcr),
            PreprocessingService::default(),
            weather_client("http://127.0.0.1:9"),
            "Dhaka",
        );
        let err = failing
            .analyze_image(&mut session, ImageSource::Upload, &png_bytes(81))
            .unwrap_err();

        assert!(matches!(err, AppError::Ocr(OcrError::Recognition(_))));
        assert!(session.temperature().is_none());
    }

    /// OCR stand-in that switches the shared session to the camera mid-recognition
    struct SwitchingOcr {
        session: Arc<Mutex<Session>>,
    }

    impl OcrEngine for SwitchingOcr {
        fn recognize(&self, _image: &GrayImage) -> Result<String, OcrError> {
            let mut session = self
                .session
                .try_lock()
                .expect("session must not be locked while OCR runs");
            session.select_source(ImageSource::Camera);
            Ok("Current reading: 25°C outside".to_string())
        }

        fn name(&self) -> &str {
            "switching"
        }
    }

    #[test]
    fn test_analyze_shared_records_result() {
        let (pipeline, calls) = pipeline_with("Reading 19°", "http://127.0.0.1:9");
        let session = Mutex::new(Session::new());

        let first = pipeline
            .analyze_shared(&session, ImageSource::Upload, &png_bytes(120))
            .unwrap();
        let again = pipeline
            .analyze_shared(&session, ImageSource::Upload, &png_bytes(120))
            .unwrap();

        assert_eq!(first.temperature, Some(19));
        assert_eq!(again.temperature, Some(19));
        assert!(!again.replaced_previous);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(session.lock().temperature(), Some(19));
    }

    #[test]
    fn test_source_switch_during_ocr_is_not_recorded() {
        let session = Arc::new(Mutex::new(Session::new()));
        let pipeline = ThermoCheck::new(
            Box::new(SwitchingOcr {
                session: Arc::clone(&session),
            }),
            PreprocessingService::default(),
            weather_client("http://127.0.0.1:9"),
            "Dhaka",
        );

        let analysis = pipeline
            .analyze_shared(&session, ImageSource::Upload, &png_bytes(60))
            .unwrap();
        assert_eq!(analysis.temperature, Some(25));

        let session = session.lock();
        assert_eq!(session.active_source(), Some(ImageSource::Camera));
        assert!(session.active_image().is_none());
        assert!(session.temperature().is_none());
        assert!(session.raw_text().is_none());
    }

    #[tokio::test]
    async fn test_compare_match() {
        let mock_server = MockServer::start().await;
        mock_weather(&mock_server, "Dhaka", 25.2).await;

        let (pipeline, _) = pipeline_with("25°C", &mock_server.uri());
        let mut session = Session::new();
        pipeline.analyze_image(&mut session, ImageSource::Upload, &png_bytes(1)).unwrap();

        let report = pipeline.compare(&session, None).await;

        assert_eq!(report.city, "Dhaka");
        assert_eq!(report.result, ComparisonResult::Match);
        assert_eq!(report.api_temperature, Some(25));
    }

    #[tokio::test]
    async fn test_compare_no_match() {
        let mock_server = MockServer::start().await;
        mock_weather(&mock_server, "Dhaka", 27.0).await;

        let (pipeline, _) = pipeline_with("25°C", &mock_server.uri());
        let report = pipeline.compare_temperature(Some(25), Some("Dhaka")).await;

        assert_eq!(report.result, ComparisonResult::NoMatch);
    }

    #[tokio::test]
    async fn test_compare_without_temperature_still_looks_up() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/2.5/weather"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "main": { "temp": 30.0 }
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let (pipeline, _) = pipeline_with("nothing", &mock_server.uri());
        let report = pipeline.compare(&Session::new(), Some("Dhaka")).await;

        assert_eq!(report.result, ComparisonResult::Incomplete);
        assert_eq!(report.reason, Some(IncompleteReason::NoTemperatureDetected));
        assert_eq!(report.api_temperature, Some(30));
    }

    #[tokio::test]
    async fn test_compare_unknown_city_is_incomplete() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("q", "Nowhereville"))
            .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
                "cod": "404",
                "message": "city not found"
            })))
            .mount(&mock_server)
            .await;

        let (pipeline, _) = pipeline_with("25°", &mock_server.uri());
        let report = pipeline.compare_temperature(Some(25), Some("Nowhereville")).await;

        assert_eq!(report.result, ComparisonResult::Incomplete);
        assert!(report.message.contains("Nowhereville"));
        tokio_test::assert_ok!(serde_json::to_string(&report));
    }
}
