//! # Integration Tests
//!
//! 集成测试与端到端测试。
//!
//! 负责：
//! - 参数解析到掩膜输出的完整流程（mock 分割器）
//! - 真实 DICOM 序列的读取与 DESS T2 统计

#[cfg(test)]
mod fixtures;

#[cfg(test)]
mod e2e_tests {
    use std::collections::BTreeSet;
    use std::fs;
    use std::path::{Path, PathBuf};

    use contracts::{Tissue, Volume, VolumeLoader};
    use dicom_io::{read_tiff_stack, DicomSeriesLoader, TiffMaskWriter};
    use kneeseg_cli::{resolve_args, Cli, CliError, Pipeline, RunPlan};
    use segmentation::{MockSegmenter, MockSegmenterConfig};
    use t2_mapping::DessT2Mapper;

    use crate::fixtures::{write_series, MemoryLoader, SeriesParams};

    fn cli(args: &[&str]) -> Cli {
        let mut argv = vec!["kneeseg"];
        argv.extend_from_slice(args);
        Cli::try_parse_args_only(argv).unwrap()
    }

    fn s(path: &Path) -> &str {
        path.to_str().unwrap()
    }

    fn plan(dicom: &Path, save: &Path, extra: &[&str]) -> RunPlan {
        let mut args = vec!["-d", s(dicom), "-s", s(save)];
        args.extend_from_slice(extra);
        resolve_args(&cli(&args)).unwrap()
    }

    fn files_in(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    /// Volume with a bright left half so whitening leaves a non-empty mask
    fn half_bright(rows: usize, columns: usize, slices: usize) -> Volume {
        Volume::from_shape_fn((rows, columns, slices), |(_, c, _)| {
            if c < columns / 2 {
                800.0
            } else {
                100.0
            }
        })
    }

    fn mock_pipeline(
        volume: Volume,
        segmenter: MockSegmenter,
    ) -> Pipeline<MemoryLoader, MockSegmenter, TiffMaskWriter, DessT2Mapper> {
        Pipeline::new(
            MemoryLoader::new(volume),
            segmenter,
            TiffMaskWriter::new(),
            DessT2Mapper::default(),
        )
    }

    /// `-f -m` on a 10-slice single-echo series writes exactly two masks
    #[test]
    fn test_selected_tissues_write_exactly_their_masks() {
        let tmp = tempfile::tempdir().unwrap();
        let save = tmp.path().join("masks");
        let plan = plan(tmp.path(), &save, &["-f", "-m"]);
        assert!(save.is_dir(), "save directory is created");

        let mut pipeline = mock_pipeline(half_bright(6, 8, 10), MockSegmenter::new());
        let stats = pipeline.run(&plan).unwrap();

        assert_eq!(
            files_in(&save),
            vec!["femoral_cartilage.tiff", "meniscus.tiff"]
        );
        assert_eq!(stats.files_written.len(), 2);
        assert!(stats.t2_summaries.is_empty());
        assert_eq!(pipeline.loader().loads.get(), 1);

        let mask = read_tiff_stack(&save.join("meniscus.tiff")).unwrap();
        assert_eq!(mask.dim(), (6, 8, 10));
        assert_eq!(mask.iter().filter(|&&v| v == 1).count(), 6 * 4 * 10);
    }

    #[test]
    fn test_default_segments_all_tissues_in_canonical_order() {
        let tmp = tempfile::tempdir().unwrap();
        let save = tmp.path().join("out");
        let plan = plan(tmp.path(), &save, &[]);

        let mut pipeline = mock_pipeline(half_bright(4, 4, 3), MockSegmenter::new());
        let stats = pipeline.run(&plan).unwrap();

        assert_eq!(pipeline.segmenter().tissues(), Tissue::ALL.to_vec());
        let written: Vec<PathBuf> = Tissue::ALL
            .iter()
            .map(|t| save.join(t.file_name("tiff")))
            .collect();
        assert_eq!(stats.files_written, written);
    }

    #[test]
    fn test_shape_mismatch_halts_before_writing_that_mask() {
        let tmp = tempfile::tempdir().unwrap();
        let save = tmp.path().join("out");
        let plan = plan(tmp.path(), &save, &["-f", "-m", "-p"]);

        let segmenter = MockSegmenter::with_config(MockSegmenterConfig {
            wrong_shape_for: BTreeSet::from([Tissue::Meniscus]),
            ..Default::default()
        });
        let mut pipeline = mock_pipeline(half_bright(4, 4, 5), segmenter);
        let err = pipeline.run(&plan).unwrap_err();

        assert!(matches!(
            err,
            CliError::ShapeInvariant {
                tissue: Tissue::Meniscus,
                expected: (4, 4, 5),
                actual: (4, 4, 6),
            }
        ));
        assert_eq!(files_in(&save), vec!["femoral_cartilage.tiff"]);
        // no further tissue is attempted
        assert_eq!(
            pipeline.segmenter().tissues(),
            vec![Tissue::FemoralCartilage, Tissue::Meniscus]
        );
    }

    #[test]
    fn test_t2_without_dess_fails_before_loading() {
        let tmp = tempfile::tempdir().unwrap();
        let save = tmp.path().join("out");
        let mut pipeline = mock_pipeline(Volume::zeros((2, 2, 2)), MockSegmenter::new());

        let err = resolve_args(&cli(&["-d", s(tmp.path()), "-s", s(&save), "--t2"]))
            .and_then(|plan| pipeline.run(&plan))
            .unwrap_err();

        assert!(matches!(err, CliError::IncompatibleFlags { .. }));
        assert!(err.to_string().contains("--dess"));
        assert_eq!(pipeline.loader().loads.get(), 0);
        assert!(!save.exists());
    }

    #[test]
    fn test_missing_dicom_dir_fails_before_creating_save_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let save = tmp.path().join("out");
        let missing = tmp.path().join("no_series");

        let err = resolve_args(&cli(&["-d", s(&missing), "-s", s(&save)])).unwrap_err();

        assert!(matches!(err, CliError::DirectoryNotFound { .. }));
        assert!(err.to_string().contains("no_series"));
        assert!(!save.exists());
    }

    #[test]
    fn test_dess_segments_first_echo_for_every_tissue() {
        let tmp = tempfile::tempdir().unwrap();
        let save = tmp.path().join("out");
        let plan = plan(tmp.path(), &save, &["--dess", "-t", "-p"]);

        // echo 1 on even slices has structure, echo 2 is uniform
        let volume = Volume::from_shape_fn((4, 4, 6), |(r, _, z)| {
            if z % 2 == 0 {
                (r * 100) as f32
            } else {
                7.0
            }
        });
        let mut pipeline = mock_pipeline(volume, MockSegmenter::new());
        pipeline.run(&plan).unwrap();

        let calls = pipeline.segmenter().calls();
        assert_eq!(calls.len(), 2);
        for (_, input) in calls {
            assert_eq!(input.dim(), (4, 4, 3));
            assert!(input[[3, 0, 0]] > input[[0, 0, 0]]);
        }
        let mask = read_tiff_stack(&save.join("tibial_cartilage.tiff")).unwrap();
        assert_eq!(mask.dim(), (4, 4, 3));
    }

    /// Interleaved DESS slices: echo 1 with a bright band, echo 2 at half
    /// intensity everywhere.
    fn dess_series(rows: u16, columns: u16, locations: usize) -> Vec<Vec<u16>> {
        let echo1: Vec<u16> = (0..rows as usize * columns as usize)
            .map(|i| if i % (columns as usize) < 2 { 2000 } else { 400 })
            .collect();
        let echo2: Vec<u16> = echo1.iter().map(|v| v / 2).collect();
        (0..locations)
            .flat_map(|_| [echo1.clone(), echo2.clone()])
            .collect()
    }

    #[test]
    fn test_dicom_series_loads_in_instance_order() {
        let tmp = tempfile::tempdir().unwrap();
        let slices: Vec<Vec<u16>> = (0..4).map(|z| vec![z * 10; 6]).collect();
        write_series(tmp.path(), 2, 3, &slices, &SeriesParams::default());
        fs::write(tmp.path().join("notes.txt"), b"ignored").unwrap();

        let (volume, reference) = DicomSeriesLoader::new()
            .load(tmp.path(), Some("dcm"))
            .unwrap();

        assert_eq!(volume.dim(), (2, 3, 4));
        let firsts: Vec<f32> = (0..4).map(|z| volume[[0, 0, z]]).collect();
        assert_eq!(firsts, vec![0.0, 10.0, 20.0, 30.0]);

        assert_eq!(reference.dims(), (2, 3, 4));
        assert_eq!(reference.repetition_time_ms, Some(18.18));
        assert_eq!(reference.echo_time_ms, Some(6.0));
        assert_eq!(reference.flip_angle_deg, Some(25.0));
        assert_eq!(reference.gl_area, Some(3132.0));
        assert_eq!(reference.tg_us, Some(1800.0));
        assert_eq!(reference.pixel_spacing, Some((0.5, 0.5)));
        assert_eq!(reference.series_description.as_deref(), Some("DESS SAG"));
    }

    #[test]
    fn test_dess_t2_flow_on_dicom_series() {
        let tmp = tempfile::tempdir().unwrap();
        let dicom = tmp.path().join("series");
        let save = tmp.path().join("out");
        fs::create_dir(&dicom).unwrap();
        write_series(&dicom, 4, 6, &dess_series(4, 6, 3), &SeriesParams::default());

        let report = tmp.path().join("t2.json");
        let plan = plan(
            &dicom,
            &save,
            &["--dess", "--t2", "-f", "-m", "--t2-report", s(&report)],
        );

        let mut pipeline = Pipeline::new(
            DicomSeriesLoader::new(),
            MockSegmenter::new(),
            TiffMaskWriter::new(),
            DessT2Mapper::new(plan.settings.t2.clone()),
        );
        let stats = pipeline.run(&plan).unwrap();

        assert_eq!(
            files_in(&save),
            vec!["femoral_cartilage.tiff", "meniscus.tiff"]
        );
        let keys: Vec<Tissue> = stats.t2_summaries.keys().copied().collect();
        assert_eq!(keys, vec![Tissue::FemoralCartilage, Tissue::Meniscus]);

        // echo ratio 0.5 with these acquisition parameters fits to ~45.6 ms
        let summary = &stats.t2_summaries[&Tissue::Meniscus];
        assert_eq!(summary.mask_voxels, 4 * 2 * 3);
        assert_eq!(summary.valid_voxels, summary.mask_voxels);
        assert!(
            summary.mean_ms > 40.0 && summary.mean_ms < 50.0,
            "{summary:?}"
        );
        assert!(summary.std_ms < 0.01);

        kneeseg_cli::commands::write_t2_report(&report, &stats.t2_summaries).unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&report).unwrap()).unwrap();
        assert_eq!(json["femoral_cartilage"]["valid_voxels"], 24);
    }

    /// Masks land in the series folder by default and must not be read back
    /// as slices, neither by the T2 pass nor by a later run.
    #[test]
    fn test_masks_saved_into_series_folder_are_not_reloaded() {
        let tmp = tempfile::tempdir().unwrap();
        let dicom = tmp.path().join("series");
        fs::create_dir(&dicom).unwrap();
        write_series(&dicom, 4, 6, &dess_series(4, 6, 2), &SeriesParams::default());
        let series_files = files_in(&dicom).len();

        let plan = resolve_args(&cli(&["-d", s(&dicom), "--dess", "--t2", "-m"])).unwrap();
        assert_eq!(plan.save_dir, dicom);

        let run = || {
            let mut pipeline = Pipeline::new(
                DicomSeriesLoader::new(),
                MockSegmenter::new(),
                TiffMaskWriter::new(),
                DessT2Mapper::new(plan.settings.t2.clone()),
            );
            pipeline.run(&plan).unwrap()
        };

        let first = run();
        assert_eq!(files_in(&dicom).len(), series_files + 1);
        assert!(dicom.join("meniscus.tiff").is_file());

        let second = run();
        assert_eq!(first.t2_summaries, second.t2_summaries);
        assert_eq!(second.t2_summaries[&Tissue::Meniscus].mask_voxels, 4 * 2 * 2);
    }

    #[test]
    fn test_settings_file_overrides_gradient_tags() {
        let tmp = tempfile::tempdir().unwrap();
        let dicom = tmp.path().join("series");
        fs::create_dir(&dicom).unwrap();
        write_series(&dicom, 2, 4, &dess_series(2, 4, 2), &SeriesParams::default());

        // same gradient area as the tags, so results must match the tag-driven run
        let config = tmp.path().join("kneeseg.toml");
        fs::write(&config, "[t2]\ngl_area = 3132.0\ntg_us = 1800.0\nmax_ms = 40.0\n").unwrap();

        let plan = plan(
            &dicom,
            &tmp.path().join("out"),
            &["--dess", "--t2", "-m", "--config", s(&config)],
        );
        assert_eq!(plan.settings.t2.max_ms, 40.0);

        let mut pipeline = Pipeline::new(
            DicomSeriesLoader::new(),
            MockSegmenter::new(),
            TiffMaskWriter::new(),
            DessT2Mapper::new(plan.settings.t2.clone()),
        );
        let stats = pipeline.run(&plan).unwrap();

        // ~45.6 ms fits lie above the configured ceiling
        let summary = &stats.t2_summaries[&Tissue::Meniscus];
        assert!(summary.mask_voxels > 0);
        assert_eq!(summary.valid_voxels, 0);
    }
}
