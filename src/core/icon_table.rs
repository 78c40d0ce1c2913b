/// Tabla estática de iconos a generar
/// Convenciones de plataforma: Android Chrome, Apple touch, tiles de Windows, favicons, Yandex

/// Entrada de la tabla: nombre de archivo de salida + dimensiones en píxeles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IconSpec {
    pub file_name: &'static str,
    pub width: u32,
    pub height: u32,
}

impl IconSpec {
    pub const fn new(file_name: &'static str, width: u32, height: u32) -> Self {
        Self { file_name, width, height }
    }

    pub fn is_square(&self) -> bool {
        self.width == self.height
    }
}

/// Catálogo completo de PNGs cuadrados, en el orden en que se generan
pub const ICON_TABLE: &[IconSpec] = &[
    IconSpec::new("android-chrome-144x144.png", 144, 144),
    IconSpec::new("android-chrome-192x192.png", 192, 192),
    IconSpec::new("android-chrome-256x256.png", 256, 256),
    IconSpec::new("android-chrome-36x36.png", 36, 36),
    IconSpec::new("android-chrome-384x384.png", 384, 384),
    IconSpec::new("android-chrome-48x48.png", 48, 48),
    IconSpec::new("android-chrome-512x512.png", 512, 512),
    IconSpec::new("android-chrome-72x72.png", 72, 72),
    IconSpec::new("android-chrome-96x96.png", 96, 96),
    IconSpec::new("apple-touch-icon-1024x1024.png", 1024, 1024),
    IconSpec::new("apple-touch-icon-114x114.png", 114, 114),
    IconSpec::new("apple-touch-icon-120x120.png", 120, 120),
    IconSpec::new("apple-touch-icon-144x144.png", 144, 144),
    IconSpec::new("apple-touch-icon-152x152.png", 152, 152),
    IconSpec::new("apple-touch-icon-167x167.png", 167, 167),
    IconSpec::new("apple-touch-icon-180x180.png", 180, 180),
    IconSpec::new("apple-touch-icon-57x57.png", 57, 57),
    IconSpec::new("apple-touch-icon-60x60.png", 60, 60),
    IconSpec::new("apple-touch-icon-72x72.png", 72, 72),
    IconSpec::new("apple-touch-icon-76x76.png", 76, 76),
    IconSpec::new("apple-touch-icon-precomposed.png", 180, 180),
    IconSpec::new("apple-touch-icon.png", 180, 180),
    IconSpec::new("favicon-16x16.png", 16, 16),
    IconSpec::new("favicon-32x32.png", 32, 32),
    IconSpec::new("favicon-48x48.png", 48, 48),
    IconSpec::new("mstile-144x144.png", 144, 144),
    IconSpec::new("mstile-150x150.png", 150, 150),
    IconSpec::new("mstile-310x310.png", 310, 310),
    IconSpec::new("mstile-70x70.png", 70, 70),
    IconSpec::new("yandex-browser-50x50.png", 50, 50),
];

/// Tile ancho de Windows. El origen cuadrado se estira a 310x150 sin corregir aspect ratio
pub const WIDE_TILE: IconSpec = IconSpec::new("mstile-310x150.png", 310, 150);

/// PNG intermedio del que sale favicon.ico
pub const ICO_INTERMEDIATE: IconSpec = IconSpec::new("favicon_temp.png", 32, 32);

pub const ICO_FILE_NAME: &str = "favicon.ico";
pub const ICO_FORMAT: &str = "ico";

/// Todos los archivos que deben quedar en el directorio destino tras una ejecución completa
pub fn expected_outputs() -> Vec<&'static str> {
    ICON_TABLE
        .iter()
        .map(|spec| spec.file_name)
        .chain([WIDE_TILE.file_name, ICO_FILE_NAME])
        .collect()
}
