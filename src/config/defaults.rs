//! Default configuration values

/// Kernel command line shared by every UKI entry
pub const UKI_CMDLINE: &str = "console=ttyS0 console=tty1 net.ifnames=1 rd.immucore.oemlabel=COS_OEM rd.immucore.debug rd.immucore.oemtimeout=2 rd.immucore.uki selinux=0";

/// Suffix appended to the baseline entry only, boots straight into the installer
pub const UKI_CMDLINE_INSTALL: &str = "install-mode";

/// Squashfs compressor executable
pub const MKSQUASHFS: &str = "mksquashfs";

/// Default squashfs block size
pub const SQUASHFS_BLOCK_SIZE: &str = "1024k";

/// Default squashfs compression algorithm
pub const SQUASHFS_COMPRESSION: &str = "xz";

/// Default mode for created directories
pub const DIR_PERM: u32 = 0o755;

/// Mode for read-only pseudo filesystem mount points
pub const NO_WRITE_DIR_PERM: u32 = 0o555;

/// World-writable with the sticky bit
pub const TEMP_DIR_PERM: u32 = 0o1777;

/// Default mode for created files
pub const FILE_PERM: u32 = 0o644;

/// Read buffer size used when hashing files
pub const CHECKSUM_CHUNK_SIZE: usize = 64 * 1024;

/// Settings file name inside the config directory
pub const SETTINGS_FILE_NAME: &str = "config.toml";

/// Minimum proptest iterations
pub const MIN_PROPTEST_ITERATIONS: u32 = 100;
